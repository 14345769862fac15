//! SIRI-VM (vehicle monitoring) documents.
//!
//! Only the parts of the schema we pass on are modelled; serde skips the
//! rest. Each `VehicleActivity` becomes one [`VehicleObservation`].

use chrono::DateTime;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::VehicleObservation;

use super::error::FeedError;

/// Root `Siri` element.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SiriDelivery {
    pub service_delivery: ServiceDelivery,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServiceDelivery {
    pub vehicle_monitoring_delivery: VehicleMonitoringDelivery,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct VehicleMonitoringDelivery {
    pub vehicle_activity: Vec<VehicleActivity>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct VehicleActivity {
    pub recorded_at_time: Option<String>,
    pub item_identifier: Option<String>,
    pub valid_until_time: Option<String>,
    pub monitored_vehicle_journey: MonitoredVehicleJourney,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MonitoredVehicleJourney {
    pub line_ref: Option<String>,
    pub direction_ref: Option<String>,
    pub framed_vehicle_journey_ref: Option<FramedVehicleJourneyRef>,
    pub published_line_name: Option<String>,
    pub operator_ref: Option<String>,
    pub origin_ref: Option<String>,
    pub origin_name: Option<String>,
    pub destination_ref: Option<String>,
    pub destination_name: Option<String>,
    pub origin_aimed_departure_time: Option<String>,
    pub vehicle_location: Option<VehicleLocation>,
    pub bearing: Option<String>,
    pub block_ref: Option<String>,
    pub vehicle_journey_ref: Option<String>,
    pub vehicle_ref: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct FramedVehicleJourneyRef {
    pub data_frame_ref: Option<String>,
    pub dated_vehicle_journey_ref: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct VehicleLocation {
    pub longitude: Option<String>,
    pub latitude: Option<String>,
}

impl VehicleActivity {
    /// The trip this vehicle is running, if it says.
    fn trip_id(&self) -> Option<&str> {
        let journey = &self.monitored_vehicle_journey;
        journey
            .framed_vehicle_journey_ref
            .as_ref()
            .and_then(|f| f.dated_vehicle_journey_ref.as_deref())
            .or(journey.vehicle_journey_ref.as_deref())
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Convert to an observation, or `None` if the activity has no trip
    /// reference or no usable timestamp.
    fn into_observation(self) -> Option<VehicleObservation> {
        let trip_id = self.trip_id()?.to_string();
        let recorded = self.recorded_at_time.as_deref()?.trim();
        let recorded_at_time = match DateTime::parse_from_rfc3339(recorded) {
            Ok(t) => t,
            Err(e) => {
                debug!(%trip_id, recorded, error = %e, "dropping activity with bad timestamp");
                return None;
            }
        };

        let journey = self.monitored_vehicle_journey;
        let (data_frame_ref, dated_ref) = journey
            .framed_vehicle_journey_ref
            .map(|f| (f.data_frame_ref, f.dated_vehicle_journey_ref))
            .unwrap_or_default();
        let (longitude, latitude) = journey
            .vehicle_location
            .map(|l| (l.longitude, l.latitude))
            .unwrap_or_default();

        let mut fields = Map::new();
        let mut put = |name: &str, value: Value| {
            fields.insert(name.to_string(), value);
        };
        put("item_identifier", opt(self.item_identifier));
        put("valid_until_time", opt(self.valid_until_time));
        put("line_ref", opt(journey.line_ref));
        put("direction_ref", opt(journey.direction_ref));
        put("operator_ref", opt(journey.operator_ref));
        put("data_frame_ref", opt(data_frame_ref));
        put("dated_vehicle_journey_ref", opt(dated_ref));
        put("vehicle_journey_ref", opt(journey.vehicle_journey_ref));
        put("vehicle_ref", opt(journey.vehicle_ref));
        put("published_line_name", opt(journey.published_line_name));
        put("origin_ref", opt(journey.origin_ref));
        put("origin_name", opt(journey.origin_name));
        put("destination_ref", opt(journey.destination_ref));
        put("destination_name", opt(journey.destination_name));
        put(
            "origin_aimed_departure_time",
            opt(journey.origin_aimed_departure_time),
        );
        put("block_ref", opt(journey.block_ref));
        put("longitude", number(longitude));
        put("latitude", number(latitude));
        put("bearing", number(journey.bearing));

        Some(VehicleObservation {
            trip_id,
            recorded_at_time,
            fields,
        })
    }
}

fn opt<T: Into<Value>>(value: Option<T>) -> Value {
    value.map_or(Value::Null, Into::into)
}

/// Numeric fields arrive as text; anything unparseable passes through as null.
fn number(value: Option<String>) -> Value {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .map_or(Value::Null, Into::into)
}

/// Parse a SIRI-VM document into observations, in document order.
///
/// Activities without a trip reference cannot be matched against the
/// timetable and are dropped.
pub fn parse_siri_vm(xml: &str) -> Result<Vec<VehicleObservation>, FeedError> {
    let siri: SiriDelivery = quick_xml::de::from_str(xml)?;
    let activities = siri.service_delivery.vehicle_monitoring_delivery.vehicle_activity;
    let total = activities.len();

    let observations: Vec<_> = activities
        .into_iter()
        .filter_map(VehicleActivity::into_observation)
        .collect();

    if observations.len() < total {
        debug!(
            total,
            kept = observations.len(),
            "dropped vehicle activities without trip or timestamp"
        );
    }

    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Siri xmlns="http://www.siri.org.uk/siri" version="2.0">
  <ServiceDelivery>
    <ResponseTimestamp>2024-03-15T08:05:00+00:00</ResponseTimestamp>
    <ProducerRef>DepartmentForTransport</ProducerRef>
    <VehicleMonitoringDelivery>
      <ResponseTimestamp>2024-03-15T08:05:00+00:00</ResponseTimestamp>
      <VehicleActivity>
        <RecordedAtTime>2024-03-15T08:04:30+00:00</RecordedAtTime>
        <ItemIdentifier>a1</ItemIdentifier>
        <ValidUntilTime>2024-03-15T08:10:00+00:00</ValidUntilTime>
        <MonitoredVehicleJourney>
          <LineRef>4</LineRef>
          <DirectionRef>outbound</DirectionRef>
          <FramedVehicleJourneyRef>
            <DataFrameRef>2024-03-15</DataFrameRef>
            <DatedVehicleJourneyRef>T1</DatedVehicleJourneyRef>
          </FramedVehicleJourneyRef>
          <PublishedLineName>4</PublishedLineName>
          <OperatorRef>FCYM</OperatorRef>
          <OriginRef>S0</OriginRef>
          <DestinationRef>S9</DestinationRef>
          <VehicleLocation>
            <Longitude>-3.94</Longitude>
            <Latitude>51.62</Latitude>
          </VehicleLocation>
          <Bearing>90.0</Bearing>
          <VehicleRef>V100</VehicleRef>
        </MonitoredVehicleJourney>
        <Extensions>
          <VehicleJourney><DriverRef>42</DriverRef></VehicleJourney>
        </Extensions>
      </VehicleActivity>
      <VehicleActivity>
        <RecordedAtTime>2024-03-15T08:03:00+00:00</RecordedAtTime>
        <MonitoredVehicleJourney>
          <LineRef>7</LineRef>
          <VehicleRef>V200</VehicleRef>
        </MonitoredVehicleJourney>
      </VehicleActivity>
      <VehicleActivity>
        <RecordedAtTime>2024-03-15T08:02:00+00:00</RecordedAtTime>
        <MonitoredVehicleJourney>
          <VehicleJourneyRef>T2</VehicleJourneyRef>
          <VehicleRef>V300</VehicleRef>
        </MonitoredVehicleJourney>
      </VehicleActivity>
    </VehicleMonitoringDelivery>
  </ServiceDelivery>
</Siri>"#;

    #[test]
    fn parses_activities_in_order() {
        let observations = parse_siri_vm(SAMPLE).unwrap();

        let trips: Vec<_> = observations.iter().map(|o| o.trip_id.as_str()).collect();
        assert_eq!(trips, vec!["T1", "T2"]);
    }

    #[test]
    fn maps_passthrough_fields() {
        let observations = parse_siri_vm(SAMPLE).unwrap();
        let first = &observations[0];

        assert_eq!(
            first.recorded_at_time,
            DateTime::parse_from_rfc3339("2024-03-15T08:04:30Z").unwrap()
        );
        assert_eq!(first.fields["vehicle_ref"], "V100");
        assert_eq!(first.fields["line_ref"], "4");
        assert_eq!(first.fields["operator_ref"], "FCYM");
        assert_eq!(first.fields["latitude"], 51.62);
        assert_eq!(first.fields["longitude"], -3.94);
        assert_eq!(first.fields["bearing"], 90.0);
        assert_eq!(first.fields["data_frame_ref"], "2024-03-15");
        assert!(first.fields["origin_name"].is_null());
    }

    #[test]
    fn falls_back_to_vehicle_journey_ref() {
        let observations = parse_siri_vm(SAMPLE).unwrap();
        assert_eq!(observations[1].trip_id, "T2");
        assert_eq!(observations[1].fields["vehicle_ref"], "V300");
    }

    #[test]
    fn drops_bad_timestamps() {
        let xml = r#"<Siri><ServiceDelivery><VehicleMonitoringDelivery>
            <VehicleActivity>
              <RecordedAtTime>yesterday</RecordedAtTime>
              <MonitoredVehicleJourney><VehicleJourneyRef>T1</VehicleJourneyRef></MonitoredVehicleJourney>
            </VehicleActivity>
        </VehicleMonitoringDelivery></ServiceDelivery></Siri>"#;

        assert!(parse_siri_vm(xml).unwrap().is_empty());
    }

    #[test]
    fn bad_numbers_do_not_drop_the_document() {
        let xml = r#"<Siri xmlns="http://www.siri.org.uk/siri" version="2.0"><ServiceDelivery><VehicleMonitoringDelivery>
            <VehicleActivity>
              <RecordedAtTime>2024-03-15T08:04:30+00:00</RecordedAtTime>
              <MonitoredVehicleJourney>
                <VehicleJourneyRef>T1</VehicleJourneyRef>
                <VehicleLocation><Longitude>-3.94</Longitude><Latitude>51.62</Latitude></VehicleLocation>
                <Bearing>90.0</Bearing>
              </MonitoredVehicleJourney>
            </VehicleActivity>
            <VehicleActivity>
              <RecordedAtTime>2024-03-15T08:04:40+00:00</RecordedAtTime>
              <MonitoredVehicleJourney>
                <VehicleJourneyRef>T2</VehicleJourneyRef>
                <VehicleLocation><Longitude>west</Longitude><Latitude></Latitude></VehicleLocation>
                <Bearing></Bearing>
              </MonitoredVehicleJourney>
            </VehicleActivity>
        </VehicleMonitoringDelivery></ServiceDelivery></Siri>"#;

        let observations = parse_siri_vm(xml).unwrap();
        let trips: Vec<_> = observations.iter().map(|o| o.trip_id.as_str()).collect();
        assert_eq!(trips, vec!["T1", "T2"]);

        assert_eq!(observations[0].fields["bearing"], 90.0);
        assert_eq!(observations[0].fields["longitude"], -3.94);
        assert!(observations[1].fields["bearing"].is_null());
        assert!(observations[1].fields["longitude"].is_null());
        assert!(observations[1].fields["latitude"].is_null());
    }

    #[test]
    fn empty_delivery() {
        let xml = r#"<Siri><ServiceDelivery><VehicleMonitoringDelivery/></ServiceDelivery></Siri>"#;
        assert!(parse_siri_vm(xml).unwrap().is_empty());
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(matches!(
            parse_siri_vm("<Siri><ServiceDelivery>"),
            Err(FeedError::Xml(_))
        ));
    }
}
