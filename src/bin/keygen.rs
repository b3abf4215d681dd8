use alloy::signers::local::coins_bip39::{English, Mnemonic};
use faucet_army::{Fleet, MasterSecret};

const PREVIEW: u32 = 4;

fn main() -> anyhow::Result<()> {
    println!("\nGenerating a fresh seed phrase for the bot army...\n");

    let mnemonic = Mnemonic::<English>::new_with_count(&mut rand::thread_rng(), 12)?;
    let phrase = mnemonic.to_phrase();
    let fleet = Fleet::new(MasterSecret::new(phrase.clone())?);

    println!("Seed phrase: {}", phrase);
    println!();
    for (i, address) in fleet.derive_public_batch(PREVIEW)?.iter().enumerate() {
        let role = if i == 0 { " (treasury)" } else { "" };
        println!("Bot #{}{}: {}", i, role, address);
    }
    println!();

    println!("INSTRUCTIONS:");
    println!("1. Put MNEMONIC=\"<seed phrase>\" in .env.");
    println!("2. Send FSN to the treasury address to pay for subscriptions and gas.");
    println!("3. Run: cargo run --bin army -- subscribe <limit>");

    Ok(())
}
