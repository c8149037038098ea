/// Label prepended to the domain for DNS-01 challenge records
pub const CHALLENGE_PREFIX: &str = "_acme-challenge";

/// Strips the wildcard label, since `*.example.com` is validated
/// through the same record as `example.com`.
pub fn normalize_domain(domain: &str) -> &str {
    domain.strip_prefix("*.").unwrap_or(domain)
}

/// Fully qualified name of the challenge record for a domain
pub fn challenge_record_name(domain: &str) -> String {
    format!("{}.{}", CHALLENGE_PREFIX, normalize_domain(domain))
}

/// Concatenates the character strings of a TXT record and removes
/// any surrounding quotes left by the resolver's text form.
pub fn txt_value<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined: String = segments
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect();
    let trimmed = joined.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed)
        .to_string()
}
