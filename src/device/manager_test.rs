//! Tests for DeviceManager

#[cfg(test)]
mod tests {
    use crate::adb::client::AdbClient;
    use crate::core::DeviceState;
    use crate::device::DeviceManager;
    use crate::error::AdbError;
    use crate::testing::fixtures::DEVICES_L;
    use crate::testing::{MockConnector, Wire};

    fn manager(payload: &str) -> DeviceManager<MockConnector> {
        let connector = MockConnector::new(vec![Wire::new().okay().hex_string(payload).build()]);
        DeviceManager::new(AdbClient::with_connector(connector))
    }

    #[test]
    fn test_list_devices() {
        let devices = manager(DEVICES_L).list_devices().unwrap();
        assert_eq!(devices.len(), 3);
        assert!(devices[0].is_available());
        assert!(!devices[1].is_available());
    }

    #[test]
    fn test_find_device_partial_match() {
        let device = manager(DEVICES_L).find_device("5554").unwrap();
        assert_eq!(device.serial.as_str(), "emulator-5554");
    }

    #[test]
    fn test_find_device_case_insensitive() {
        let device = manager(DEVICES_L).find_device("r58m").unwrap();
        assert_eq!(device.serial.as_str(), "R58M123ABC");
        assert_eq!(device.state, DeviceState::Unauthorized);
    }

    #[test]
    fn test_find_device_not_found() {
        assert!(matches!(
            manager(DEVICES_L).find_device("pixel"),
            Err(AdbError::DeviceNotFound(_))
        ));
    }

    #[test]
    fn test_find_device_ambiguous() {
        // "5" appears in every serial
        match manager(DEVICES_L).find_device("5") {
            Err(AdbError::InvalidArgument(message)) => assert!(message.contains("3 devices")),
            other => panic!("expected InvalidArgument, got {:?}", other),
        }
    }

    #[test]
    fn test_get_single_device() {
        let device = manager("emulator-5554\tdevice\n").get_single_device().unwrap();
        assert_eq!(device.serial.as_str(), "emulator-5554");
        assert_eq!(device.state, DeviceState::Online);
    }

    #[test]
    fn test_get_single_device_none() {
        assert!(matches!(
            manager("").get_single_device(),
            Err(AdbError::DeviceNotFound(_))
        ));
    }

    #[test]
    fn test_get_single_device_several() {
        assert!(matches!(
            manager(DEVICES_L).get_single_device(),
            Err(AdbError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_get_target_device() {
        let device = manager(DEVICES_L).get_target_device(Some("192.168")).unwrap();
        assert_eq!(device.state, DeviceState::Offline);
        assert!(manager(DEVICES_L).get_target_device(None).is_err());
    }
}
