use crate::bank::QuestionBank;
use crate::error::{Error, Result};
use crate::question::Question;
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet};

/// Decides how many questions each category contributes.
///
/// `total` is split evenly, the remainder going one apiece to the earliest
/// categories. Whatever a category cannot supply is handed out round-robin,
/// in the same order, to categories that still have questions left. The
/// result never exceeds a pool and sums to `min(total, sum of pools)`.
pub fn allocate(pool_sizes: &[usize], total: usize) -> Vec<usize> {
    let k = pool_sizes.len();
    if k == 0 {
        return Vec::new();
    }

    let base = total / k;
    let remainder = total % k;
    let mut counts = Vec::with_capacity(k);
    let mut shortfall = 0;
    for (i, &size) in pool_sizes.iter().enumerate() {
        let share = base + usize::from(i < remainder);
        let take = share.min(size);
        shortfall += share - take;
        counts.push(take);
    }

    if shortfall > 0 {
        debug!("[Sampler] Redistributing a shortfall of {}.", shortfall);
    }
    // Whole rounds at once: every category with supply left gets the same
    // amount, up to what the shallowest of them can still give.
    while shortfall > 0 {
        let open: Vec<usize> = (0..k).filter(|&i| counts[i] < pool_sizes[i]).collect();
        if open.is_empty() {
            debug!("[Sampler] Out of supply with {} still unfilled.", shortfall);
            break;
        }
        let rounds = open
            .iter()
            .map(|&i| pool_sizes[i] - counts[i])
            .min()
            .unwrap_or(0)
            .min(shortfall / open.len());
        if rounds == 0 {
            // Less than one full round left; earliest categories go first.
            for &i in open.iter().take(shortfall) {
                counts[i] += 1;
            }
            break;
        }
        for &i in &open {
            counts[i] += rounds;
        }
        shortfall -= rounds * open.len();
    }

    counts
}

fn check_distinct<S: AsRef<str>>(categories: &[S]) -> Result<()> {
    let mut seen = HashSet::with_capacity(categories.len());
    for c in categories {
        if !seen.insert(c.as_ref()) {
            return Err(Error::DuplicateCategory(c.as_ref().to_string()));
        }
    }
    Ok(())
}

/// Draws up to `requested` questions spread evenly over `categories`.
///
/// Questions outside `categories` are never returned, and no question is
/// returned twice. If the listed categories hold fewer than `requested`
/// questions, all of them are returned. The result is shuffled so that
/// categories are not grouped together.
pub fn sample_balanced<S, R>(
    bank: &QuestionBank,
    requested: i32,
    categories: &[S],
    rng: &mut R,
) -> Result<Vec<Question>>
where
    S: AsRef<str>,
    R: Rng + ?Sized,
{
    let total = usize::try_from(requested).map_err(|_| Error::NegativeCount(requested))?;
    check_distinct(categories)?;

    if total == 0 || categories.is_empty() || bank.is_empty() {
        debug!("[Sampler] Nothing to draw.");
        return Ok(Vec::new());
    }

    let slots: HashMap<&str, usize> = categories
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_ref(), i))
        .collect();
    let mut pools: Vec<Vec<&Question>> = vec![Vec::new(); categories.len()];
    for q in bank.questions() {
        if let Some(&slot) = slots.get(q.category.as_str()) {
            pools[slot].push(q);
        }
    }

    let sizes: Vec<usize> = pools.iter().map(Vec::len).collect();
    let counts = allocate(&sizes, total);
    debug!("[Sampler] Pool sizes {:?}, drawing {:?}.", sizes, counts);

    let mut drawn = Vec::with_capacity(counts.iter().sum());
    for (pool, &count) in pools.iter_mut().zip(&counts) {
        let (chosen, _) = pool.partial_shuffle(rng, count);
        drawn.extend(chosen.iter().map(|&q| q.clone()));
    }
    drawn.shuffle(rng);

    if drawn.len() < total {
        debug!(
            "[Sampler] Only {} of {} requested questions available.",
            drawn.len(),
            total
        );
    }
    Ok(drawn)
}

/// [`sample_balanced`] using the thread-local generator.
pub fn sample_balanced_default<S: AsRef<str>>(
    bank: &QuestionBank,
    requested: i32,
    categories: &[S],
) -> Result<Vec<Question>> {
    sample_balanced(bank, requested, categories, &mut rand::rng())
}
