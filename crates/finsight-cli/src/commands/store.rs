//! Raw key-value store command implementations

use anyhow::{Context, Result};
use finsight_core::storage::{is_available, BackendKind, StorageGateway};

pub async fn cmd_store_put(
    gateway: &StorageGateway,
    key: &str,
    value: &str,
    secure: bool,
) -> Result<()> {
    let saved = if secure {
        gateway.save_securely(key, value).await
    } else {
        gateway.save(key, value).await
    };
    saved.with_context(|| format!("Failed to write '{}'", key))?;

    println!("✅ Saved '{}' ({} backend)", key, gateway.kind());
    Ok(())
}

pub async fn cmd_store_get(gateway: &StorageGateway, key: &str, secure: bool) -> Result<()> {
    let value = if secure {
        gateway.get_securely(key).await
    } else {
        gateway.get(key).await
    };

    match value {
        Some(value) => println!("{}", value),
        None => println!("(no value for '{}')", key),
    }
    Ok(())
}

pub async fn cmd_store_remove(gateway: &StorageGateway, key: &str) -> Result<()> {
    gateway.remove(key).await?;
    println!("🗑️  Removed '{}'", key);
    Ok(())
}

pub async fn cmd_store_clear(gateway: &StorageGateway, confirmed: bool) -> Result<()> {
    if !confirmed {
        println!(
            "⚠️  This deletes every stored value in the {} backend at {}.",
            gateway.kind(),
            gateway.data_dir().display()
        );
        println!("   Re-run with --yes to confirm.");
        return Ok(());
    }

    gateway.clear().await?;
    println!("🧹 Cleared {} storage", gateway.kind());
    Ok(())
}

pub async fn cmd_store_probe(gateway: &StorageGateway) -> Result<()> {
    println!("🔌 Storage backends under {}", gateway.data_dir().display());
    for kind in [BackendKind::Local, BackendKind::Sqlite] {
        let status = if is_available(kind, gateway.data_dir()).await {
            "✅ available"
        } else {
            "❌ unavailable"
        };
        let active = if kind == gateway.kind() { " (active)" } else { "" };
        println!("   {:<7} {}{}", kind.as_str(), status, active);
    }
    Ok(())
}
