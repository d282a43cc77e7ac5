//! The `nomodia validate` command.

use std::path::PathBuf;

use anyhow::Result;

use nomodia_core::pools::load_pools;
use nomodia_core::SetKind;

pub fn execute(pools_path: PathBuf) -> Result<()> {
    let pools = load_pools(&pools_path)?;

    println!("Pool file: {}", pools_path.display());
    for kind in SetKind::ALL {
        println!("  {kind}: {} statements", pools.for_kind(kind).len());
    }
    println!("Pools valid ({} questions in total).", pools.total());

    Ok(())
}
