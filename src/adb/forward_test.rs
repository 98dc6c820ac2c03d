use super::forward::{ForwardData, ForwardSpec};
use crate::error::AdbError;

#[test]
fn test_parse_tcp() {
    let spec: ForwardSpec = "tcp:1234".parse().unwrap();
    assert_eq!(spec, ForwardSpec::Tcp(1234));
    assert_eq!(spec.to_string(), "tcp:1234");
}

#[test]
fn test_parse_sockets() {
    let spec: ForwardSpec = "localabstract:/tmp/1234".parse().unwrap();
    assert_eq!(spec, ForwardSpec::LocalAbstract("/tmp/1234".into()));
    assert_eq!(spec.to_string(), "localabstract:/tmp/1234");

    assert_eq!(
        "localreserved:debug".parse::<ForwardSpec>().unwrap(),
        ForwardSpec::LocalReserved("debug".into())
    );
    assert_eq!(
        "localfilesystem:/data/sock".parse::<ForwardSpec>().unwrap(),
        ForwardSpec::LocalFilesystem("/data/sock".into())
    );
    assert_eq!(
        "dev:/dev/ttyS0".parse::<ForwardSpec>().unwrap(),
        ForwardSpec::Device("/dev/ttyS0".into())
    );

    let spec: ForwardSpec = "LOCAL:/tmp/adb.sock".parse().unwrap();
    assert_eq!(spec, ForwardSpec::LocalPath("/tmp/adb.sock".into()));
    assert_eq!(spec.to_string(), "local:/tmp/adb.sock");
    assert_eq!(spec.kind(), "local");
}

#[test]
fn test_parse_jdwp() {
    let spec: ForwardSpec = "jdwp:4321".parse().unwrap();
    assert_eq!(spec, ForwardSpec::Jdwp(4321));
    assert_eq!(spec.to_string(), "jdwp:4321");
}

#[test]
fn test_kind_is_case_insensitive() {
    assert_eq!(
        "TCP:80".parse::<ForwardSpec>().unwrap(),
        ForwardSpec::Tcp(80)
    );
    assert_eq!(
        "LocalAbstract:chrome_devtools_remote"
            .parse::<ForwardSpec>()
            .unwrap()
            .to_string(),
        "localabstract:chrome_devtools_remote"
    );
}

#[test]
fn test_value_keeps_later_colons() {
    let spec: ForwardSpec = "localabstract:a:b".parse().unwrap();
    assert_eq!(spec, ForwardSpec::LocalAbstract("a:b".into()));
}

#[test]
fn test_invalid_specs() {
    for bad in ["abc", "tcp:xyz", "jdwp:abc", "xyz:1234", "tcp:", ":80", "tcp:70000"] {
        let err = bad.parse::<ForwardSpec>().unwrap_err();
        assert!(matches!(err, AdbError::Format(_)), "accepted {:?}", bad);
    }
}

#[test]
fn test_forward_data_from_line() {
    let data: ForwardData = "emulator-5554 tcp:1 tcp:2".parse().unwrap();
    assert_eq!(data.serial.as_str(), "emulator-5554");
    assert_eq!(data.local_spec().unwrap(), ForwardSpec::Tcp(1));
    assert_eq!(data.remote_spec().unwrap(), ForwardSpec::Tcp(2));
    assert_eq!(data.to_string(), "emulator-5554 tcp:1 tcp:2");
}

#[test]
fn test_forward_list_parsing() {
    let text = "123456789 tcp:1 tcp:2\n123456789 tcp:3 tcp:4\n\n123456789 tcp:5 localabstract:/dev/socket/x\n";
    let list = ForwardData::parse_list(text).unwrap();

    assert_eq!(list.len(), 3);
    assert_eq!(list[1].local, "tcp:3");
    assert_eq!(
        list[2].remote_spec().unwrap(),
        ForwardSpec::LocalAbstract("/dev/socket/x".into())
    );
    assert!(ForwardData::parse_list("").unwrap().is_empty());
}

#[test]
fn test_forward_data_malformed_line() {
    assert!(matches!(
        "only-two tcp:1".parse::<ForwardData>(),
        Err(AdbError::Format(_))
    ));
}
