pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse comma-separated seeds; negative values use their magnitude.
pub fn parse_seeds(s: &str) -> anyhow::Result<Vec<u64>> {
    split_csv(s)
        .iter()
        .map(|token| {
            if let Ok(value) = token.parse::<i64>() {
                return Ok(value.unsigned_abs());
            }
            token
                .parse::<u64>()
                .map_err(|err| anyhow::anyhow!("invalid seed {token:?}: {err}"))
        })
        .collect()
}
