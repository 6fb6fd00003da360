use anyhow::Result;

use QuiverBloom::PersistentFilter;

use crate::cli::Common;
use crate::util::config_for;

/// CLI: init — создать новый zero-filled файл фильтра.
pub fn exec(common: Common) -> Result<()> {
    let cfg = config_for(&common)?;
    let f = PersistentFilter::create(&common.path, &cfg)?;
    f.flush()?;
    println!(
        "Initialized bloom at {} (m={}, bytes={}, k={})",
        f.path().display(),
        f.bit_len(),
        f.byte_len(),
        f.hash_kinds().len()
    );
    Ok(())
}
