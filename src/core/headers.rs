use http::{HeaderMap, HeaderName, HeaderValue, header};

/// Inbound header names that never reach the upstream.
#[derive(Debug, Clone)]
pub struct ExcludedHeaders {
    names: Vec<HeaderName>,
}

impl ExcludedHeaders {
    /// Parse header names (any case). Invalid names are reported back.
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self, http::header::InvalidHeaderName> {
        let names = names
            .iter()
            .map(|name| HeaderName::from_bytes(name.as_ref().as_bytes()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { names })
    }

    pub fn contains(&self, name: &HeaderName) -> bool {
        self.names.contains(name)
    }
}

impl Default for ExcludedHeaders {
    fn default() -> Self {
        Self {
            names: vec![header::HOST, header::CONNECTION, header::CONTENT_LENGTH],
        }
    }
}

/// Build the upstream header set from the inbound one.
///
/// Starts from `content-type: application/json`, then copies every inbound
/// header not in `excluded`, keeping all values of repeated headers. An
/// inbound `content-type` replaces the baseline. The inbound cookie header is
/// applied last so it is forwarded regardless of the exclusion set.
pub fn forward_headers(inbound: &HeaderMap, excluded: &ExcludedHeaders) -> HeaderMap {
    let mut outbound = HeaderMap::with_capacity(inbound.len() + 1);
    outbound.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );

    for name in inbound.keys() {
        if excluded.contains(name) {
            continue;
        }
        let mut values = inbound.get_all(name).iter();
        if let Some(first) = values.next() {
            outbound.insert(name.clone(), first.clone());
        }
        for value in values {
            outbound.append(name.clone(), value.clone());
        }
    }

    if inbound.contains_key(header::COOKIE) {
        outbound.remove(header::COOKIE);
        for value in inbound.get_all(header::COOKIE) {
            outbound.append(header::COOKIE, value.clone());
        }
    }

    outbound
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inbound() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("tickets.example.com"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("17"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer t0k3n"));
        headers.insert(header::COOKIE, HeaderValue::from_static("session=abc"));
        headers.append("x-trace", HeaderValue::from_static("one"));
        headers.append("x-trace", HeaderValue::from_static("two"));
        headers
    }

    #[test]
    fn excluded_headers_are_dropped_and_others_kept() {
        let outbound = forward_headers(&inbound(), &ExcludedHeaders::default());

        assert!(!outbound.contains_key(header::HOST));
        assert!(!outbound.contains_key(header::CONNECTION));
        assert!(!outbound.contains_key(header::CONTENT_LENGTH));
        assert_eq!(outbound[header::AUTHORIZATION], "Bearer t0k3n");
        assert_eq!(outbound[header::COOKIE], "session=abc");

        let traces: Vec<_> = outbound.get_all("x-trace").iter().collect();
        assert_eq!(traces, vec!["one", "two"]);
    }

    #[test]
    fn baseline_content_type_is_json() {
        let outbound = forward_headers(&HeaderMap::new(), &ExcludedHeaders::default());
        assert_eq!(outbound[header::CONTENT_TYPE], "application/json");
        assert_eq!(outbound.len(), 1);
    }

    #[test]
    fn inbound_content_type_wins_over_baseline() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        let outbound = forward_headers(&headers, &ExcludedHeaders::default());
        assert_eq!(outbound[header::CONTENT_TYPE], "text/plain");
        assert_eq!(outbound.get_all(header::CONTENT_TYPE).iter().count(), 1);
    }

    #[test]
    fn cookie_survives_even_when_excluded() {
        let excluded = ExcludedHeaders::parse(&["Host", "Cookie"]).unwrap();
        let outbound = forward_headers(&inbound(), &excluded);
        assert_eq!(outbound[header::COOKIE], "session=abc");
    }

    #[test]
    fn exclusion_names_are_case_insensitive() {
        let excluded = ExcludedHeaders::parse(&["AUTHORIZATION"]).unwrap();
        let outbound = forward_headers(&inbound(), &excluded);
        assert!(!outbound.contains_key(header::AUTHORIZATION));
        assert!(outbound.contains_key(header::HOST));
    }

    #[test]
    fn invalid_exclusion_name_is_rejected() {
        assert!(ExcludedHeaders::parse(&["bad header"]).is_err());
    }
}
