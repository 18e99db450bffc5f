#![cfg(feature = "derive")]

use cotter::session::DecodeError;
use cotter::source::RawOptions;
use cotter::typed::{FromOpts, OptValue, decode};

#[derive(Debug, PartialEq, FromOpts)]
struct Netdev {
    id: Option<String>,
    mac: Option<String>,
    #[opt("queue-count")]
    queues: u64,
    vhost: bool,
    cpus: Vec<u64>,
}

#[test]
fn decode_netdev() {
    let options =
        RawOptions::parse("id=net0,mac=52:54:00:12:34:56,queue-count=8,vhost,cpus=0-3,cpus=6")
            .unwrap();

    assert_eq!(
        decode::<Netdev>(&options).unwrap(),
        Netdev {
            id: Some("net0".into()),
            mac: Some("52:54:00:12:34:56".into()),
            queues: 8,
            vhost: true,
            cpus: vec![0, 1, 2, 3, 6],
        }
    );
}

#[test]
fn decode_netdev_missing_mandatory() {
    let options = RawOptions::parse("vhost=on,cpus=0").unwrap();

    assert_eq!(
        decode::<Netdev>(&options),
        Err(DecodeError::MissingParameter("queue-count".into()))
    );
}

#[test]
fn decode_netdev_unrecognized_extra() {
    let options = RawOptions::parse("queue-count=8,vhost=on,cpus=0,spice=off").unwrap();

    assert_eq!(
        decode::<Netdev>(&options),
        Err(DecodeError::InvalidParameter("spice".into()))
    );
}

#[derive(Debug, PartialEq, OptValue)]
enum Policy {
    Default,
    PreferHuge,
    #[opt("bind")]
    BindToNode,
}

#[derive(Debug, PartialEq, FromOpts)]
struct HostMemory {
    policy: Policy,
    #[opt("host-nodes")]
    host_nodes: Vec<u64>,
}

#[derive(Debug, PartialEq, FromOpts)]
struct Memdev {
    #[opt(size)]
    mem: u64,
    #[opt("max-mem", size)]
    max_mem: Option<u64>,
    #[opt(nested)]
    host: HostMemory,
}

#[test]
fn decode_nested_and_sizes() {
    let options =
        RawOptions::parse("mem=512M,policy=prefer-huge,host-nodes=0-1,host-nodes=4").unwrap();

    assert_eq!(
        decode::<Memdev>(&options).unwrap(),
        Memdev {
            mem: 512 << 20,
            max_mem: None,
            host: HostMemory {
                policy: Policy::PreferHuge,
                host_nodes: vec![0, 1, 4],
            },
        }
    );
}

#[test]
fn decode_optional_size() {
    let options = RawOptions::parse("mem=1G,max-mem=2G,policy=bind,host-nodes=0").unwrap();

    let memdev = decode::<Memdev>(&options).unwrap();
    assert_eq!(memdev.max_mem, Some(2 << 30));
    assert_eq!(memdev.host.policy, Policy::BindToNode);
}

#[test]
fn decode_rejects_unknown_tag() {
    let options = RawOptions::parse("mem=1G,policy=interleave,host-nodes=0").unwrap();

    assert_eq!(
        decode::<Memdev>(&options),
        Err(DecodeError::InvalidParameterValue {
            name: "policy".into(),
            expected: "default|prefer-huge|bind".into(),
        })
    );
}

#[derive(Debug, PartialEq, FromOpts)]
struct Serial {
    port: u16,
    type_: String,
}

#[test]
fn decode_narrowed_and_reserved_names() {
    let options = RawOptions::parse("port=4555,type=virtio").unwrap();

    assert_eq!(
        decode::<Serial>(&options).unwrap(),
        Serial {
            port: 4555,
            type_: "virtio".into(),
        }
    );
}

#[test]
fn decode_narrowed_out_of_range() {
    let options = RawOptions::parse("port=70000,type=virtio").unwrap();

    assert_eq!(
        decode::<Serial>(&options),
        Err(DecodeError::InvalidParameterValue {
            name: "port".into(),
            expected: "a u16 value".into(),
        })
    );
}

#[derive(Debug, PartialEq, FromOpts)]
struct Flags {
    verbose: Option<bool>,
    labels: Option<Vec<String>>,
}

#[test]
fn decode_absent_optionals() {
    let options = RawOptions::parse("").unwrap();

    assert_eq!(
        decode::<Flags>(&options).unwrap(),
        Flags {
            verbose: None,
            labels: None,
        }
    );
}

#[test]
fn decode_repeated_strings() {
    let options = RawOptions::parse("verbose=off,labels=a,labels=b").unwrap();

    assert_eq!(
        decode::<Flags>(&options).unwrap(),
        Flags {
            verbose: Some(false),
            labels: Some(vec!["a".into(), "b".into()]),
        }
    );
}
