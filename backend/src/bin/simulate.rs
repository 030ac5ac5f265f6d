//! Fills the vote store with simulated ballots so the leaderboard has
//! something to show before the real event.

use std::error::Error;
use std::io;

use backend::config::{AppConfig, SimulationConfig};
use backend::store::VoteStore;
use ring::rand::{SecureRandom, SystemRandom};
use shared::{DeviceClass, Roster, VoteMetadata};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEVICES: [DeviceClass; 5] = [
    DeviceClass::IPhone,
    DeviceClass::AndroidPhone,
    DeviceClass::IPad,
    DeviceClass::MacDesktop,
    DeviceClass::WindowsDesktop,
];

struct Dice(SystemRandom);

impl Dice {
    /// Random index in `0..n`.
    fn below(&self, n: usize) -> io::Result<usize> {
        let mut bytes = [0u8; 4];
        self.0.fill(&mut bytes)
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "system random source unavailable"))?;
        Ok(u32::from_le_bytes(bytes) as usize % n.max(1))
    }

    fn shuffle<T>(&self, items: &mut [T]) -> io::Result<()> {
        for i in (1..items.len()).rev() {
            items.swap(i, self.below(i + 1)?);
        }
        Ok(())
    }
}

/// Casts one random ballot for each of up to `simulation.voters` shuffled
/// roster members, skipping anyone already on the ledger. Nobody nominates
/// themselves. Returns the names that voted.
async fn run(
    store: &VoteStore,
    roster: &Roster,
    simulation: &SimulationConfig,
    dice: &Dice,
) -> Result<Vec<String>, Box<dyn Error>> {
    let mut voters = roster.voters.clone();
    dice.shuffle(&mut voters)?;
    voters.truncate(simulation.voters);

    info!("🚀 Simulating {} voters into {}", voters.len(), store.path().display());

    let mut cast = Vec::new();
    for (i, voter) in voters.iter().enumerate() {
        if store.has_voted(voter)? {
            info!("⏭️ {} already voted, skipping", voter);
            continue;
        }

        let candidates: Vec<_> = roster.voters.iter().filter(|c| *c != voter).collect();
        if candidates.is_empty() {
            info!("Roster has nobody for {} to nominate", voter);
            break;
        }

        let metadata = VoteMetadata {
            ip: format!("192.168.1.{}", 10 + dice.below(245)?),
            user_agent: DEVICES[dice.below(DEVICES.len())?].label().to_string(),
            raw_ua: "Simulated/1.0".to_string(),
        };

        for category in &roster.categories {
            let choice = candidates[dice.below(candidates.len())?];
            store.record_vote(category, choice, voter, Some(metadata.clone()))?;
            info!("   ✅ {} voted for {} in '{}'", voter, choice, category);
        }
        cast.push(voter.clone());

        if i + 1 < voters.len() && !simulation.delay.is_zero() {
            tokio::time::sleep(simulation.delay).await;
        }
    }

    Ok(cast)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();
    let simulation = SimulationConfig::from_env();
    let store = VoteStore::new(&config.votes_file);
    store.initialize()?;

    let cast = run(&store, &config.roster, &simulation, &Dice(SystemRandom::new())).await?;

    info!("✅ Simulation complete: {} ballots cast", cast.len());
    Ok(())
}
