//! Registry of the API action names an access key permission may grant.
//!
//! Action names are matched case-sensitively against this registry when a
//! key is created or its permissions are replaced. A permission with no
//! action set is a wildcard and is not validated here.

use std::collections::HashSet;

use once_cell::sync::Lazy;

pub const GET_NETWORK: &str = "GetNetwork";
pub const GET_DEVICE: &str = "GetDevice";
pub const GET_DEVICE_STATE: &str = "GetDeviceState";
pub const GET_DEVICE_NOTIFICATION: &str = "GetDeviceNotification";
pub const GET_DEVICE_COMMAND: &str = "GetDeviceCommand";
pub const REGISTER_DEVICE: &str = "RegisterDevice";
pub const CREATE_DEVICE_NOTIFICATION: &str = "CreateDeviceNotification";
pub const CREATE_DEVICE_COMMAND: &str = "CreateDeviceCommand";
pub const UPDATE_DEVICE_COMMAND: &str = "UpdateDeviceCommand";
pub const GET_CURRENT_USER: &str = "GetCurrentUser";
pub const UPDATE_CURRENT_USER: &str = "UpdateCurrentUser";
pub const MANAGE_ACCESS_KEY: &str = "ManageAccessKey";
pub const MANAGE_OAUTH_GRANT: &str = "ManageOAuthGrant";
pub const MANAGE_USER: &str = "ManageUser";
pub const MANAGE_CONFIGURATION: &str = "ManageConfiguration";
pub const MANAGE_NETWORK: &str = "ManageNetwork";
pub const MANAGE_OAUTH_CLIENT: &str = "ManageOAuthClient";

/// Actions available to any key owner
static CLIENT_ACTIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        GET_NETWORK,
        GET_DEVICE,
        GET_DEVICE_STATE,
        GET_DEVICE_NOTIFICATION,
        GET_DEVICE_COMMAND,
        REGISTER_DEVICE,
        CREATE_DEVICE_NOTIFICATION,
        CREATE_DEVICE_COMMAND,
        UPDATE_DEVICE_COMMAND,
        GET_CURRENT_USER,
        UPDATE_CURRENT_USER,
        MANAGE_ACCESS_KEY,
        MANAGE_OAUTH_GRANT,
    ]
    .into_iter()
    .collect()
});

/// Actions reserved for administrators
static ADMIN_ACTIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        MANAGE_USER,
        MANAGE_CONFIGURATION,
        MANAGE_NETWORK,
        MANAGE_OAUTH_CLIENT,
    ]
    .into_iter()
    .collect()
});

static KNOWN_ACTIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    CLIENT_ACTIONS.union(&ADMIN_ACTIONS).copied().collect()
});

/// All action names a client-role key may carry
pub fn client_actions() -> impl Iterator<Item = &'static str> {
    CLIENT_ACTIONS.iter().copied()
}

/// All action names reserved for administrators
pub fn admin_actions() -> impl Iterator<Item = &'static str> {
    ADMIN_ACTIONS.iter().copied()
}

/// Check whether a single action name is known
pub fn is_known_action(action: &str) -> bool {
    KNOWN_ACTIONS.contains(action)
}

/// Find the first unknown action in a set, if any
pub fn first_unknown_action<'a, I>(actions: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    actions.into_iter().find(|a| !is_known_action(a))
}
