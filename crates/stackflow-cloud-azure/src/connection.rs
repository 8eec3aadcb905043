//! Connection string and resource name helpers

/// Storage account names: 3-24 characters, lowercase letters and digits
pub const STORAGE_NAME_MIN: usize = 3;
pub const STORAGE_NAME_MAX: usize = 24;

/// IoT Hub service connection string for a shared access policy
pub fn hub_connection_string(host_name: &str, policy: &str, key: &str) -> String {
    format!(
        "HostName={};SharedAccessKeyName={};SharedAccessKey={}",
        host_name, policy, key
    )
}

/// IoT Hub device connection string
pub fn device_connection_string(host_name: &str, device_id: &str, key: &str) -> String {
    format!(
        "HostName={};DeviceId={};SharedAccessKey={}",
        host_name, device_id, key
    )
}

/// Storage account connection string
pub fn storage_connection_string(account: &str, key: &str) -> String {
    format!(
        "DefaultEndpointsProtocol=https;AccountName={};AccountKey={};EndpointSuffix=core.windows.net",
        account, key
    )
}

/// Lowercase the name, drop every character a storage account name cannot
/// contain and cut the result to the maximum length
pub fn sanitize_storage_name(name: &str) -> String {
    name.chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .take(STORAGE_NAME_MAX)
        .collect()
}

pub fn is_valid_storage_name(name: &str) -> bool {
    (STORAGE_NAME_MIN..=STORAGE_NAME_MAX).contains(&name.len())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}
