/*
 * Responsibility
 * - tokio runtime 軌道
 * - app::run() の呼び出し（ロジックは置かない）
 */
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    stateless_auth::app::run().await?;
    Ok(())
}
