//! Naming rules for provider registries
//!
//! Every resource and data source is registered under a [`QualifiedName`] of
//! the form `<provider>_<derived name>`. The derived name comes from the
//! descriptor's collection path (or its explicit name hint) with the API
//! version appended, e.g. `/v1/widgets` becomes `widgets_v1`. Nested paths
//! are prefixed with their parent's name: `/v1/cdns/{id}/firewalls` becomes
//! `cdns_v1_firewalls`.

use crate::{ProviderError, Result};
use serde::{Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Convert a name to the lower snake_case form accepted by the host tool
///
/// camelCase and PascalCase are split on case boundaries (acronym aware) and
/// any character that is not alphanumeric becomes an underscore.
pub fn to_compliant_name(s: &str) -> String {
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() {
            // Split before an uppercase letter that starts a new word:
            // fooBar -> foo_bar, v1Api -> v1_api, HTTPServer -> http_server
            let starts_word = i > 0
                && (chars[i - 1].is_lowercase()
                    || chars[i - 1].is_ascii_digit()
                    || (i + 1 < chars.len() && chars[i + 1].is_lowercase()));

            if starts_word && !result.ends_with('_') {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else if ch.is_alphanumeric() {
            result.push(ch);
        } else if !result.is_empty() && !result.ends_with('_') {
            result.push('_');
        }
    }

    result.trim_matches('_').to_string()
}

/// Detect simple API version segments like `v1`, `v2`
pub fn is_version_segment(segment: &str) -> bool {
    let segment = segment.trim();
    segment.len() > 1
        && segment.starts_with('v')
        && segment[1..].chars().all(|c| c.is_ascii_digit())
}

/// Detect templated path segments like `{id}`
pub fn is_path_parameter(segment: &str) -> bool {
    segment.starts_with('{') && segment.ends_with('}')
}

fn path_segments(path: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    while segments.last().is_some_and(|s| is_path_parameter(s)) {
        segments.pop();
    }
    segments
}

fn render_level(name: &str, version: Option<&str>, previous_version: Option<&str>) -> String {
    let name = to_compliant_name(name);
    match version {
        Some(version)
            if previous_version != Some(version)
                && !name.is_empty()
                && !name.ends_with(&format!("_{}", version)) =>
        {
            format!("{}_{}", name, version)
        }
        _ => name,
    }
}

/// A static path segment together with the version in effect for it
struct Level<'a> {
    segment: &'a str,
    version: Option<&'a str>,
    collection_path: String,
}

/// Derive the registry name of a descriptor from its path
///
/// Shorthand for [`derive_nested_resource_name`] when no parent is known by
/// name.
///
/// ```
/// use openapi_provider_common::naming::derive_resource_name;
///
/// assert_eq!(derive_resource_name("/v1/widgets", None), "widgets_v1");
/// assert_eq!(derive_resource_name("/v1/widgets", Some("thing")), "thing_v1");
/// assert_eq!(
///     derive_resource_name("/v1/cdns/{cdn_id}/firewalls", None),
///     "cdns_v1_firewalls"
/// );
/// ```
pub fn derive_resource_name(path: &str, preferred_name: Option<&str>) -> String {
    derive_nested_resource_name(path, preferred_name, |_| None)
}

/// Derive the registry name of a descriptor, naming parents through `parent_name`
///
/// Trailing path parameters are ignored. A static segment followed by a path
/// parameter names a parent level, the last static segment names the leaf.
/// A level carries the `_<version>` suffix only when its version differs
/// from the level before it, so `/v1/cdns/{id}/firewalls` is
/// `cdns_v1_firewalls`. The preferred name, when given, replaces the leaf
/// segment.
///
/// `parent_name` maps a parent's collection path to its derived name. The
/// nearest parent it knows replaces that level and every level above it.
///
/// ```
/// use openapi_provider_common::naming::derive_nested_resource_name;
///
/// let name = derive_nested_resource_name("/v1/cdns/{id}/firewalls", Some("firewall"), |path| {
///     (path == "/v1/cdns").then(|| "cdn_v1".to_string())
/// });
/// assert_eq!(name, "cdn_v1_firewall");
/// ```
pub fn derive_nested_resource_name<F>(
    path: &str,
    preferred_name: Option<&str>,
    parent_name: F,
) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut parents: Vec<Level> = Vec::new();
    let mut version: Option<&str> = None;
    let mut current: Option<Level> = None;
    let mut prefix = String::new();

    for segment in path_segments(path) {
        prefix.push('/');
        prefix.push_str(segment);
        if is_path_parameter(segment) {
            parents.extend(current.take());
        } else if is_version_segment(segment) {
            version = Some(segment);
        } else {
            current = Some(Level {
                segment,
                version,
                collection_path: prefix.clone(),
            });
        }
    }

    let anchor = parents.iter().enumerate().rev().find_map(|(i, level)| {
        parent_name(&level.collection_path).map(|name| (i, name, level.version))
    });
    let (mut rendered, first_level, mut previous_version) = match anchor {
        Some((i, name, anchor_version)) => (vec![name], i + 1, anchor_version),
        None => (Vec::new(), 0, None),
    };

    let leaf_version = current.as_ref().map_or(version, |level| level.version);
    let leaf = preferred_name
        .or(current.as_ref().map(|level| level.segment))
        .map(|name| (name, leaf_version));

    let levels = parents[first_level..]
        .iter()
        .map(|level| (level.segment, level.version))
        .chain(leaf);
    for (name, version) in levels {
        let level = render_level(name, version, previous_version);
        if !level.is_empty() {
            rendered.push(level);
            previous_version = version;
        }
    }

    rendered.join("_")
}

/// Collection paths of the parents a nested path lives under
///
/// `/v1/cdns/{cdn_id}/firewalls` has the single parent `/v1/cdns`.
pub fn parent_paths(path: &str) -> Vec<String> {
    let segments = path_segments(path);
    let mut parents = Vec::new();
    let mut prefix = String::new();

    for (i, segment) in segments.iter().enumerate() {
        let followed_by_parameter = segments
            .get(i + 1)
            .is_some_and(|next| is_path_parameter(next));
        if !is_path_parameter(segment) && followed_by_parameter {
            parents.push(format!("{}/{}", prefix, segment));
        }
        prefix.push('/');
        prefix.push_str(segment);
    }

    parents
}

/// Registry key of a resource or data source: `<provider>_<derived name>`
#[derive(Debug, Clone, Eq, PartialOrd, Ord)]
pub struct QualifiedName {
    full: String,
    prefix_len: usize,
}

impl QualifiedName {
    pub fn new(provider_name: &str, derived_name: &str) -> Result<Self> {
        if derived_name.is_empty() {
            return Err(ProviderError::EmptyResourceName);
        }
        Ok(Self {
            full: format!("{}_{}", provider_name, derived_name),
            prefix_len: provider_name.len() + 1,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.full
    }

    /// The name without the provider prefix
    pub fn derived_name(&self) -> &str {
        &self.full[self.prefix_len..]
    }

    /// Name of the read-only data source derived from this resource
    pub fn instance_name(&self) -> QualifiedName {
        QualifiedName {
            full: format!("{}_instance", self.full),
            prefix_len: self.prefix_len,
        }
    }

    /// Property a nested data source uses to reference this parent
    pub fn id_property(&self) -> String {
        format!("{}_id", self.full)
    }
}

impl PartialEq for QualifiedName {
    fn eq(&self, other: &Self) -> bool {
        self.full == other.full
    }
}

impl Hash for QualifiedName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.full.hash(state);
    }
}

impl Borrow<str> for QualifiedName {
    fn borrow(&self) -> &str {
        &self.full
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

impl Serialize for QualifiedName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_compliant_name() {
        assert_eq!(
            to_compliant_name("someNonTerraformCompliantName"),
            "some_non_terraform_compliant_name"
        );
        assert_eq!(to_compliant_name("HTTPServer"), "http_server");
        assert_eq!(to_compliant_name("X-Request-ID"), "x_request_id");
        assert_eq!(to_compliant_name("api_key_auth"), "api_key_auth");
        assert_eq!(to_compliant_name("__test__"), "test");
        assert_eq!(to_compliant_name("some.resource name"), "some_resource_name");
        assert_eq!(to_compliant_name("v1Api"), "v1_api");
    }

    #[test]
    fn test_is_version_segment() {
        assert!(is_version_segment("v1"));
        assert!(is_version_segment("v22"));
        assert!(!is_version_segment("v"));
        assert!(!is_version_segment("vendors"));
        assert!(!is_version_segment("1"));
    }

    #[test]
    fn test_derive_resource_name_from_path() {
        assert_eq!(derive_resource_name("/v1/collision", None), "collision_v1");
        assert_eq!(derive_resource_name("/collision_v1", None), "collision_v1");
        assert_eq!(derive_resource_name("/widgets", None), "widgets");
        assert_eq!(derive_resource_name("/v1/widgets/", None), "widgets_v1");
        assert_eq!(derive_resource_name("/v1/widgets/{id}", None), "widgets_v1");
        assert_eq!(derive_resource_name("/api/v2/widgets", None), "widgets_v2");
        assert_eq!(derive_resource_name("/v1/fooBars", None), "foo_bars_v1");
    }

    #[test]
    fn test_derive_resource_name_with_preferred_name() {
        assert_eq!(derive_resource_name("/v1/abc", Some("collision")), "collision_v1");
        assert_eq!(derive_resource_name("/xyz", Some("collision_v1")), "collision_v1");
        assert_eq!(derive_resource_name("/v1/xyz", Some("collision_v1")), "collision_v1");
        assert_eq!(derive_resource_name("/things", Some("thing")), "thing");
    }

    #[test]
    fn test_derive_nested_resource_name() {
        assert_eq!(
            derive_resource_name("/v1/cdns/{cdn_id}/firewalls", None),
            "cdns_v1_firewalls"
        );
        assert_eq!(
            derive_resource_name("/v1/cdns/{cdn_id}/v2/firewalls", None),
            "cdns_v1_firewalls_v2"
        );
        assert_eq!(
            derive_resource_name("/v1/cdns/{cdn_id}/firewalls", Some("rules")),
            "cdns_v1_rules"
        );
        assert_eq!(
            derive_resource_name("/cdns/{cdn_id}/firewalls", None),
            "cdns_firewalls"
        );
        assert_eq!(
            derive_resource_name("/v1/cdns/{cdn_id}/firewalls/{firewall_id}/rules", None),
            "cdns_v1_firewalls_rules"
        );
    }

    #[test]
    fn test_derive_nested_resource_name_from_parent_names() {
        let parent_names = |path: &str| match path {
            "/v1/cdns" => Some("cdn_v1".to_string()),
            _ => None,
        };

        assert_eq!(
            derive_nested_resource_name("/v1/cdns/{id}/firewalls", Some("firewall"), parent_names),
            "cdn_v1_firewall"
        );
        assert_eq!(
            derive_nested_resource_name("/v1/cdns/{id}/firewalls", None, parent_names),
            "cdn_v1_firewalls"
        );
        assert_eq!(
            derive_nested_resource_name("/v1/cdns/{id}/firewalls/{fid}/rules", None, parent_names),
            "cdn_v1_firewalls_rules"
        );
        assert_eq!(
            derive_nested_resource_name("/v1/cdns/{id}/v2/firewalls", None, parent_names),
            "cdn_v1_firewalls_v2"
        );
        // A parent's own path is never looked up
        assert_eq!(
            derive_nested_resource_name("/v1/cdns", Some("cdn"), parent_names),
            "cdn_v1"
        );
    }

    #[test]
    fn test_derive_empty_name() {
        assert_eq!(derive_resource_name("/", None), "");
        assert_eq!(derive_resource_name("/v1/{id}", None), "");
    }

    #[test]
    fn test_parent_paths() {
        assert!(parent_paths("/v1/widgets").is_empty());
        assert!(parent_paths("/v1/widgets/{id}").is_empty());
        assert_eq!(parent_paths("/v1/cdns/{cdn_id}/firewalls"), vec!["/v1/cdns"]);
        assert_eq!(
            parent_paths("/v1/cdns/{cdn_id}/firewalls/{firewall_id}/rules"),
            vec!["/v1/cdns", "/v1/cdns/{cdn_id}/firewalls"]
        );
    }

    #[test]
    fn test_qualified_name() {
        let name = QualifiedName::new("acme", "widgets_v1").unwrap();
        assert_eq!(name.as_str(), "acme_widgets_v1");
        assert_eq!(name.derived_name(), "widgets_v1");
        assert_eq!(name.instance_name().as_str(), "acme_widgets_v1_instance");
        assert_eq!(name.id_property(), "acme_widgets_v1_id");
    }

    #[test]
    fn test_qualified_name_rejects_empty_name() {
        let err = QualifiedName::new("acme", "").unwrap_err();
        assert_eq!(err.to_string(), "resource name can not be empty");
    }
}
