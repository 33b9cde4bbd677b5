use anyhow::{anyhow, Result};

pub fn validate_bind_addr(value: &str) -> Result<()> {
    value
        .parse::<std::net::SocketAddr>()
        .map(|_| ())
        .map_err(|err| anyhow!("invalid bind_addr: {}", err))
}

pub fn validate_http_url(field: &str, value: &str) -> Result<()> {
    let trimmed = value.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(anyhow!("{} must be an http(s) url, got '{}'", field, trimmed));
    }
    Ok(())
}

pub fn validate_positive(field: &str, value: u64) -> Result<()> {
    if value == 0 {
        return Err(anyhow!("{} must be greater than 0", field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_addresses_and_urls() {
        assert!(validate_bind_addr("0.0.0.0:8000").is_ok());
        assert!(validate_bind_addr("localhost").is_err());
        assert!(validate_http_url("geocoder_url", "https://nominatim.openstreetmap.org/search").is_ok());
        assert!(validate_http_url("geocoder_url", "ftp://example.com").is_err());
        assert!(validate_positive("max_body_bytes", 0).is_err());
    }
}
