use itertools::Itertools;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    pub base: String,
    pub owner: String,
    pub name: String,
}

/// Splits `scheme://host/owner/.../name` into its base, owner path and name.
///
/// Returns `None` when the URL does not have exactly one `://` or has fewer
/// than two path segments after the host. Callers treat `None` as "leave the
/// fields as they were"; validation catches anything left unset.
pub fn parse_repo_url(url: &str) -> Option<ParsedUrl> {
    let (scheme, rest) = match url.split("://").collect::<Vec<_>>().as_slice() {
        [scheme, rest] => (*scheme, *rest),
        _ => return None,
    };

    let segments: Vec<&str> = rest.split('/').collect();
    if segments.len() < 3 {
        return None;
    }

    let last = segments.len() - 1;
    Some(ParsedUrl {
        base: format!("{scheme}://{}", segments[0]),
        owner: segments[1..last].iter().join("/"),
        name: segments[last].to_string(),
    })
}
