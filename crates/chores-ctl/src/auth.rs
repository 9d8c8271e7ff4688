use anyhow::{bail, Context, Result};
use chores_app::{AppController, PinOutcome};
use chores_common::pin::PinBuffer;
use tracing::debug;
use zeroize::Zeroizing;

/// Read a secret from the terminal without echo.
pub async fn read_secret(label: &'static str) -> Result<Zeroizing<String>> {
    let secret = tokio::task::spawn_blocking(move || rpassword::prompt_password(label))
        .await
        .context("Input task failed")?
        .context("Failed to read PIN")?;
    Ok(Zeroizing::new(secret))
}

fn check_pad_digits(pin: &str) -> Result<()> {
    if pin.len() != PinBuffer::CAPACITY || !pin.chars().all(|c| c.is_ascii_digit()) {
        bail!("PIN must be exactly {} digits", PinBuffer::CAPACITY);
    }
    Ok(())
}

/// Prompt for the parent PIN and type it into the controller's PIN pad.
/// On first use this sets the PIN.
pub async fn authenticate(controller: &AppController) -> Result<()> {
    let needs_setup = controller.read(|s| s.needs_setup).await;
    let label = if needs_setup { "Choose a parent PIN (4 digits): " } else { "Enter parent PIN: " };

    let pin = read_secret(label).await?;
    let digits = pin.trim();
    check_pad_digits(digits)?;

    controller.open_pin_pad().await;
    let mut outcome = PinOutcome::Pending;
    for digit in digits.chars() {
        outcome = controller.enter_pin(digit).await?;
    }

    if outcome != PinOutcome::Authenticated {
        let reason = controller
            .read(|s| s.pin_pad.error.clone())
            .await
            .unwrap_or_else(|| "Incorrect PIN".to_string());
        bail!("Authentication failed: {}", reason);
    }

    if needs_setup {
        println!("Parent PIN set.");
    }
    debug!("Parent session started");
    Ok(())
}
