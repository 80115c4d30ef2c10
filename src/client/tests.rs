use super::descriptor::{ConnectionDescriptor, generate_client_id};
use crate::utils::DescriptorError;

#[test]
fn test_descriptor_new() {
    let d = ConnectionDescriptor::new(" broker.local ", 1883, "Sensor/THP2", "petnet_1").unwrap();
    assert_eq!(d.broker(), "broker.local");
    assert_eq!(d.port(), 1883);
    assert_eq!(d.topic(), "Sensor/THP2");
    assert_eq!(d.client_id(), "petnet_1");
    assert_eq!(d.to_string(), "mqtt://broker.local:1883/Sensor/THP2 as petnet_1");
}

#[test]
fn test_descriptor_rejects_missing_fields() {
    assert_eq!(
        ConnectionDescriptor::new("  ", 1883, "t", "c"),
        Err(DescriptorError::EmptyBroker)
    );
    assert_eq!(
        ConnectionDescriptor::new("b", 1883, "", "c"),
        Err(DescriptorError::EmptyTopic)
    );
    assert_eq!(
        ConnectionDescriptor::new("b", 0, "t", "c"),
        Err(DescriptorError::InvalidPort(0))
    );
    assert_eq!(
        ConnectionDescriptor::new("b", 1883, "t", ""),
        Err(DescriptorError::InvalidClientId)
    );
    assert_eq!(
        ConnectionDescriptor::new("b", 1883, "t", " leading"),
        Err(DescriptorError::InvalidClientId)
    );
}

#[test]
fn test_with_client_id_keeps_coordinates() {
    let d = ConnectionDescriptor::new("b", 1884, "t", "first").unwrap();
    let other = d.with_client_id("second").unwrap();
    assert_eq!(other.broker(), "b");
    assert_eq!(other.port(), 1884);
    assert_eq!(other.topic(), "t");
    assert_eq!(other.client_id(), "second");
}

#[test]
fn test_generate_client_id_is_unique() {
    let a = generate_client_id("petnet_client_");
    let b = generate_client_id("petnet_client_");
    assert!(a.starts_with("petnet_client_"));
    assert!(a.len() > "petnet_client_".len());
    assert_ne!(a, b);
}
