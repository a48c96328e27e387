//! Biome coverage.
use std::collections::BTreeMap;

use crate::climate::Biome;

/// Cell count per biome; every biome appears, zero counts included.
pub fn compute_biome_histogram<'a>(
    biomes: impl IntoIterator<Item = &'a Biome>,
) -> BTreeMap<Biome, usize> {
    let mut hist: BTreeMap<Biome, usize> = Biome::ALL.iter().map(|&b| (b, 0)).collect();
    for b in biomes {
        *hist.entry(*b).or_default() += 1;
    }
    hist
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_covers_every_biome() {
        let cells = [Biome::Ocean, Biome::Ocean, Biome::Taiga];
        let hist = compute_biome_histogram(&cells);
        assert_eq!(hist.len(), Biome::ALL.len());
        assert_eq!(hist[&Biome::Ocean], 2);
        assert_eq!(hist[&Biome::Taiga], 1);
        assert_eq!(hist[&Biome::Desert], 0);
        assert_eq!(hist.values().sum::<usize>(), 3);
    }
}
