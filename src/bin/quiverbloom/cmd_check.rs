use anyhow::Result;

use QuiverBloom::PersistentFilter;

use crate::cli::Common;
use crate::util::{config_for, decode_key_arg, display_text, ensure_exists};

/// CLI: check — "возможно есть" / "точно нет".
pub fn exec(common: Common, key: String) -> Result<()> {
    let cfg = config_for(&common)?;
    ensure_exists(&common.path)?;
    let key = decode_key_arg(&key)?;
    let f = PersistentFilter::open_with_config(&common.path, &cfg)?;
    if f.check(&key) {
        println!("MAYBE PRESENT '{}'", display_text(&key));
    } else {
        println!("ABSENT '{}'", display_text(&key));
    }
    Ok(())
}
