//! File-backed provider.
//!
//! The file maps request kinds to canonical payloads:
//!
//! ```json
//! { "odds": [{ "league": "NFL", "away_team": "GB", "home_team": "CHI", "spread": -3.5, "total": 44.5 }] }
//! ```
//!
//! Useful for exercising normalization and validation without network
//! access, and for feeding records produced by an external scraper.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde_json::Value;
use sideline_acquisition::{
    AcquisitionError, FnAdapter, ProviderAdapter, RawRecord, RawSchema, RequestKind,
};

pub const REPLAY_PROVIDER: &str = "replay";

pub fn load(path: &Path) -> anyhow::Result<Arc<dyn ProviderAdapter>> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let payloads: HashMap<RequestKind, Vec<Value>> =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    Ok(adapter(payloads))
}

pub fn adapter(payloads: HashMap<RequestKind, Vec<Value>>) -> Arc<dyn ProviderAdapter> {
    let kinds: Vec<RequestKind> = RequestKind::ALL
        .into_iter()
        .filter(|kind| payloads.contains_key(kind))
        .collect();
    let payloads = Arc::new(payloads);

    Arc::new(FnAdapter::new(REPLAY_PROVIDER, &kinds, move |request| {
        let payloads = Arc::clone(&payloads);
        async move {
            let kind = request.kind();
            payloads
                .get(&kind)
                .into_iter()
                .flatten()
                .map(|payload| {
                    RawRecord::from_value(
                        REPLAY_PROVIDER,
                        RawSchema::Canonical,
                        kind.record_kind(),
                        payload.clone(),
                    )
                    .ok_or_else(|| AcquisitionError::Parse {
                        provider: REPLAY_PROVIDER.to_string(),
                        message: format!("{} payload is not an object", kind),
                        transient: false,
                    })
                })
                .collect::<Result<Vec<_>, _>>()
        }
    }))
}
