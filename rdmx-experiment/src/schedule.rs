use rdmx_core::Angle;
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    Practice,
    Main,
}

/// One planned trial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialPlan {
    pub block: Block,
    /// Position within its block, from zero.
    pub index: usize,
    pub target: Angle,
    pub coherence: f64,
}

/// `n` practice trials, each with a random target and coherence level.
pub fn practice_block<R: Rng>(n: usize, levels: &[f64], rng: &mut R) -> Vec<TrialPlan> {
    (0..n)
        .filter_map(|index| {
            let target = *Angle::ALL.choose(rng)?;
            let coherence = *levels.choose(rng)?;
            Some(TrialPlan {
                block: Block::Practice,
                index,
                target,
                coherence,
            })
        })
        .collect()
}

/// Every target × coherence combination, `repetitions` times. Each
/// repetition is shuffled on its own, so combinations stay balanced over the
/// block but nothing prevents the same target twice in a row.
pub fn main_block<R: Rng>(levels: &[f64], repetitions: usize, rng: &mut R) -> Vec<TrialPlan> {
    let combos: Vec<(Angle, f64)> = Angle::ALL
        .iter()
        .flat_map(|&a| levels.iter().map(move |&c| (a, c)))
        .collect();

    let mut trials = Vec::with_capacity(combos.len() * repetitions);
    for _ in 0..repetitions {
        let mut rep = combos.clone();
        rep.shuffle(rng);
        trials.extend(rep);
    }

    trials
        .into_iter()
        .enumerate()
        .map(|(index, (target, coherence))| TrialPlan {
            block: Block::Main,
            index,
            target,
            coherence,
        })
        .collect()
}
