use serde::{Deserialize, Serialize};

/// Connection metadata with secrets redacted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RedactedConnection {
    pub engine: Option<String>,
    pub host: Option<String>,
    pub database: Option<String>,
    pub redacted: String,
}

/// Redact passwords from a URL-style connection string.
///
/// The redacted form is safe to log and doubles as the backend identity used
/// to key schema caches.
pub fn redact_connection_string(conn: &str) -> RedactedConnection {
    let Some(scheme_end) = conn.find("://") else {
        return RedactedConnection {
            engine: None,
            host: None,
            database: None,
            redacted: redact_query(conn),
        };
    };

    let engine = conn[..scheme_end].to_string();
    let rest = &conn[scheme_end + 3..];
    let (location, query) = match rest.split_once('?') {
        Some((location, query)) => (location, Some(query)),
        None => (rest, None),
    };
    let (authority, path) = match location.split_once('/') {
        Some((authority, path)) => (authority, path),
        None => (location, ""),
    };
    let (credentials, host_port) = match authority.rsplit_once('@') {
        Some((credentials, host_port)) => (Some(credentials), host_port),
        None => (None, authority),
    };

    let mut redacted = format!("{engine}://");
    if let Some(credentials) = credentials {
        match credentials.split_once(':') {
            Some((user, _)) => redacted.push_str(&format!("{user}:***@")),
            None => redacted.push_str(&format!("{credentials}@")),
        }
    }
    redacted.push_str(host_port);
    if !path.is_empty() {
        redacted.push('/');
        redacted.push_str(path);
    }
    if let Some(query) = query {
        redacted.push('?');
        redacted.push_str(&redact_query(query));
    }

    let host = host_port
        .rsplit_once(':')
        .map(|(host, _)| host)
        .unwrap_or(host_port);

    RedactedConnection {
        engine: Some(engine),
        host: (!host.is_empty()).then(|| host.to_string()),
        database: (!path.is_empty()).then(|| path.to_string()),
        redacted,
    }
}

fn redact_query(query: &str) -> String {
    query
        .split('&')
        .map(|part| part.split(';').map(redact_pair).collect::<Vec<_>>().join(";"))
        .collect::<Vec<_>>()
        .join("&")
}

fn redact_pair(pair: &str) -> String {
    match pair.split_once('=') {
        Some((key, _))
            if key.trim().eq_ignore_ascii_case("password") || key.trim().eq_ignore_ascii_case("pwd") =>
        {
            format!("{key}=***")
        }
        _ => pair.to_string(),
    }
}
