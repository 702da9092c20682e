use rand::{
    distr::{Alphanumeric, Distribution, StandardUniform},
    seq::SliceRandom,
    Rng, SeedableRng,
};

use gymtree::{Level, Member};

pub fn get_samples(seed: u64, count: u32, name_size: usize) -> Vec<Member>
where
    StandardUniform: Distribution<u64>,
{
    let random_string = |seed: u64, size: usize| {
        rand::rngs::StdRng::seed_from_u64(seed)
            .sample_iter(Alphanumeric)
            .map(char::from)
            .take(size)
            .collect::<String>()
    };
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut ids: Vec<u32> = (0..count).collect();
    ids.shuffle(&mut rng);
    ids.into_iter()
        .map(|id| {
            let first = random_string(rng.random(), name_size);
            let last = random_string(rng.random(), name_size);
            let level = Level::from(rng.random_range(0..4u16));
            Member::new(&first, &last, id, level, rng.random())
        })
        .collect()
}
