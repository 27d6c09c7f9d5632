use crate::config::Config;
use crate::decode::RECORD_WORDS;

/// Largest hop count a report can carry (`remaining_hop_cnt` is 8 bits).
const MAX_TRANSITS: usize = 255;

pub fn validate(config: &Config) -> Result<(), String> {
    let decode = &config.decode;
    if decode.fields_per_hop < RECORD_WORDS {
        return Err(format!(
            "fields_per_hop must be >= {RECORD_WORDS}, got {}",
            decode.fields_per_hop
        ));
    }
    if decode.num_transits > MAX_TRANSITS {
        return Err(format!(
            "num_transits must be <= {MAX_TRANSITS}, got {}",
            decode.num_transits
        ));
    }

    let prefix = &config.output.file_prefix;
    if prefix.trim().is_empty() {
        return Err("output.file_prefix cannot be empty".into());
    }
    if prefix.contains(['/', '\\']) {
        return Err(format!("output.file_prefix must not contain path separators: {prefix}"));
    }

    if config.recv_buffer_bytes == Some(0) {
        return Err("recv_buffer_bytes must be > 0".into());
    }
    Ok(())
}
