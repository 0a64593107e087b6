use hexa_ledger::{
    address, generate_curve_keys, Ledger, LedgerError, LedgerResult, MemDataKeyIndex, MemTxStore,
    Tx, TxIn, TxOut,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

pub const ALICE_SEED: u64 = 1337;
pub const CAROL_SEED: u64 = 420;
pub const DATA_KEY: &str = "profile/alice";

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();

    if let Err(err) = run() {
        error!(%err, "demo failed");
        std::process::exit(1);
    }
}

fn run() -> LedgerResult<()> {
    let (_, alice) = generate_curve_keys(ALICE_SEED);
    let (_, carol) = generate_curve_keys(CAROL_SEED);
    info!(alice = %address(&alice), carol = %address(&carol), "generated keys");

    let mut ledger = Ledger::new(MemTxStore::new(), MemDataKeyIndex::new());

    let base = Tx::new(&[TxIn::base()], &[TxOut::new(DATA_KEY, &[alice], b"v0")]);
    ledger.submit_and_index(&base)?;

    let update = Tx::new(
        &[TxIn::new(base.digest(), 0, &[alice])],
        &[TxOut::new(DATA_KEY, &[alice], b"v1")],
    );
    ledger.submit_and_index(&update)?;

    let (latest, position) = ledger.resolve_data_key(&DATA_KEY.into())?;
    match latest.outputs().get(position as usize) {
        Some(output) => info!(
            key = DATA_KEY,
            tx = %latest.digest(),
            position,
            data = %String::from_utf8_lossy(&output.data),
            "resolved data key"
        ),
        None => warn!(
            key = DATA_KEY,
            tx = %latest.digest(),
            position,
            outputs = latest.outputs().len(),
            "index points past the outputs of its transaction"
        ),
    }

    // Carol cannot claim Alice's output.
    let theft = Tx::new(&[TxIn::new(update.digest(), 0, &[carol])], &[]);
    expect_rejection(ledger.submit(&theft));

    // Spending `base` again is caught against committed history.
    let replay = Tx::new(
        &[TxIn::new(base.digest(), 0, &[alice])],
        &[TxOut::new(DATA_KEY, &[alice], b"replay")],
    );
    expect_rejection(ledger.submit_batch(&[replay]));

    // Two claims on `update` inside one batch are not told apart.
    let left = Tx::new(
        &[TxIn::new(update.digest(), 0, &[alice])],
        &[TxOut::new(DATA_KEY, &[alice], b"left")],
    );
    let right = Tx::new(
        &[TxIn::new(update.digest(), 0, &[alice])],
        &[TxOut::new(DATA_KEY, &[alice], b"right")],
    );
    ledger.submit_batch(&[left, right])?;

    let unspent = ledger.find_unspent_for(&alice)?;
    info!(unspent = unspent.len(), stored = ledger.store().len(), "final state for alice");
    Ok(())
}

fn expect_rejection(result: LedgerResult<()>) {
    match result {
        Err(err @ (LedgerError::NotAuthorized { .. } | LedgerError::AlreadySpent { .. })) => {
            info!(%err, "rejected as expected")
        }
        Err(err) => error!(%err, "unexpected rejection"),
        Ok(()) => error!("transaction should have been rejected"),
    }
}
