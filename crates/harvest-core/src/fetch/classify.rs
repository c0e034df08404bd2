//! Map curl errors onto network failure kinds.

use super::outcome::NetworkErrorKind;

/// Classify a curl error: timeouts vs. connection-level failures vs. the rest.
pub fn classify_curl_error(e: &curl::Error) -> NetworkErrorKind {
    if e.is_operation_timedout() {
        return NetworkErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_ssl_connect_error()
    {
        return NetworkErrorKind::Connect;
    }
    NetworkErrorKind::Other
}
