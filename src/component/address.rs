//! Component address notation.
//!
//! Components are addressed with double-underscore notation: the first
//! segment names the root component registered in the session, the remaining
//! segments descend into nested sub-components. E.g.
//! `grid__toolbar__refresh` addresses `refresh` inside `toolbar` inside the
//! session component `grid`.

/// Delimiter separating address segments.
pub const DELIMITER: &str = "__";

/// A parsed component address: root component name plus the remaining
/// sub-component segments in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentAddress {
    pub root: String,
    pub sub_components: Vec<String>,
}

impl ComponentAddress {
    /// Split an address on the delimiter. The first segment is the root
    /// name; the rest are retained for endpoint path construction.
    pub fn parse(address: &str) -> Self {
        let mut segments = address.split(DELIMITER);
        let root = segments.next().unwrap_or_default().to_string();
        Self {
            root,
            sub_components: segments.map(str::to_string).collect(),
        }
    }

    /// Endpoint path for the batch dispatch path: sub-component segments
    /// with the (already normalized) action name appended, rejoined with
    /// the delimiter.
    pub fn endpoint_path(&self, action: &str) -> String {
        let mut segments: Vec<&str> = self.sub_components.iter().map(String::as_str).collect();
        segments.push(action);
        segments.join(DELIMITER)
    }

    /// Endpoint path for the legacy dispatch path: the remaining address
    /// segments ARE the endpoint path; nothing is appended.
    pub fn sub_path(&self) -> String {
        self.sub_components.join(DELIMITER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested() {
        let addr = ComponentAddress::parse("grid__toolbar__refresh");
        assert_eq!(addr.root, "grid");
        assert_eq!(addr.sub_components, vec!["toolbar", "refresh"]);
    }

    #[test]
    fn test_parse_bare_root() {
        let addr = ComponentAddress::parse("grid");
        assert_eq!(addr.root, "grid");
        assert!(addr.sub_components.is_empty());
    }

    #[test]
    fn test_split_rejoin_round_trip() {
        let addr = ComponentAddress::parse("a__b__c");
        assert_eq!(addr.sub_path(), "b__c");
        assert_eq!(addr.endpoint_path("x"), "b__c__x");
    }

    #[test]
    fn test_bare_root_endpoint_path_is_action_only() {
        let addr = ComponentAddress::parse("a");
        assert_eq!(addr.sub_path(), "");
        assert_eq!(addr.endpoint_path("x"), "x");
    }
}
