//! Scripted stand-in for the az CLI
//!
//! The script answers each subcommand with canned JSON and keeps its state
//! in marker files next to itself, so a second run sees what the first one
//! created. Every invocation is appended to `calls.log`.

#![allow(dead_code)]

use stackflow_cloud_azure::AzCli;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use tempfile::TempDir;

/// The hub exists
pub const HUB: &str = "hub";
/// The device identity exists
pub const DEVICE: &str = "device";
/// `iot hub show` omits properties.hostName
pub const NO_HOST_NAME: &str = "no-host-name";
/// `iot hub policy show` omits primaryKey
pub const NO_PRIMARY_KEY: &str = "no-primary-key";
/// Every command hangs until killed
pub const SLOW: &str = "slow";

const SCRIPT: &str = r#"#!/bin/sh
dir=$(dirname "$0")
echo "$*" >> "$dir/calls.log"

if [ -f "$dir/slow" ]; then
    echo $$ > "$dir/pid"
    exec sleep 30
fi

hub() {
    if [ -f "$dir/no-host-name" ]; then
        echo '{"id":"/iotHubs/hub","name":"hub","resourcegroup":"rg-iot","properties":{}}'
    else
        echo '{"id":"/iotHubs/hub","name":"hub","resourcegroup":"rg-iot","properties":{"hostName":"hub.azure-devices.net"}}'
    fi
}

device() {
    echo '{"deviceId":"e2e-diag","authentication":{"symmetricKey":{"primaryKey":"devkey="}}}'
}

case "$*" in
    "iot hub show "*)
        [ -f "$dir/hub" ] || { echo "ERROR: IotHub hub not found" >&2; exit 3; }
        hub ;;
    "iot hub create "*)
        touch "$dir/hub"
        hub ;;
    "iot hub policy show "*)
        if [ -f "$dir/no-primary-key" ]; then
            echo '{"keyName":"iothubowner"}'
        else
            echo '{"keyName":"iothubowner","primaryKey":"hubkey="}'
        fi ;;
    "iot hub device-identity show "*)
        [ -f "$dir/device" ] || { echo "ERROR: device e2e-diag not found" >&2; exit 3; }
        device ;;
    "iot hub device-identity create "*)
        touch "$dir/device"
        device ;;
    "iot hub device-twin update "*)
        echo '{}' ;;
    "monitor app-insights component create "*)
        echo '{"id":"/components/monitoring","name":"monitoring","appId":"app-1","instrumentationKey":"ikey-1"}' ;;
    "monitor app-insights api-key delete "*)
        [ -f "$dir/api-key" ] || { echo "ERROR: api key diag not found" >&2; exit 3; }
        rm "$dir/api-key" ;;
    "monitor app-insights api-key create "*)
        if [ -f "$dir/api-key" ]; then
            echo "ERROR: api key diag already exists" >&2
            exit 3
        fi
        touch "$dir/api-key"
        echo '{"apiKey":"apikey-1","name":"diag"}' ;;
    "storage account create "*)
        echo '{"id":"/storageAccounts/storagee2ediag","name":"storagee2ediag"}' ;;
    "storage account keys list "*)
        echo '[{"keyName":"key1","value":"storagekey=="}]' ;;
    *)
        echo "unexpected command: $*" >&2
        exit 2 ;;
esac
"#;

pub struct FakeAz {
    dir: TempDir,
}

impl FakeAz {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let program = dir.path().join("az");
        fs::write(&program, SCRIPT).unwrap();
        fs::set_permissions(&program, fs::Permissions::from_mode(0o755)).unwrap();
        Self { dir }
    }

    /// Start with a marker set
    pub fn with(self, marker: &str) -> Self {
        self.set(marker);
        self
    }

    pub fn set(&self, marker: &str) {
        fs::write(self.path(marker), "").unwrap();
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn az(&self) -> AzCli {
        AzCli::new().with_program(self.path("az").to_string_lossy())
    }

    /// Command lines received so far, without the trailing `--output json`
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.path("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(|line| line.trim_end_matches(" --output json").to_string())
            .collect()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    /// Pid of the hanging command, once it has started
    pub fn hanging_pid(&self) -> Option<u32> {
        fs::read_to_string(self.path("pid"))
            .ok()
            .and_then(|pid| pid.trim().parse().ok())
    }
}
