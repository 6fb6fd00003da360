use anyhow::Result;

use QuiverBloom::PersistentFilter;

use crate::cli::Common;
use crate::util::{config_for, decode_key_arg, display_text};

/// CLI: add — добавить ключи и сделать flush перед выходом.
pub fn exec(common: Common, keys: Vec<String>) -> Result<()> {
    let cfg = config_for(&common)?;
    let decoded = keys
        .iter()
        .map(|k| decode_key_arg(k))
        .collect::<Result<Vec<_>>>()?;

    let mut f = PersistentFilter::open_with_config(&common.path, &cfg)?;
    for key in &decoded {
        f.add(key);
        println!("ADDED '{}'", display_text(key));
    }
    f.flush()?;
    Ok(())
}
