use std::collections::BTreeSet;

use criterion::{criterion_group, criterion_main, Criterion};
use digitrie::{RadixTree, Trie};
use rand::{seq::SliceRandom, Rng};

fn get_samples(prefix_sizes: std::ops::Range<usize>, suffix_count: usize, suffix_size: usize) -> Vec<String> {
    let random_word = |size: usize| {
        rand::rng()
            .sample_iter(rand::distr::Uniform::new(b'a', b'z').unwrap())
            .map(char::from)
            .take(size)
            .collect::<String>()
    };
    let mut rng = rand::rng();
    let mut words = Vec::new();
    for prefix_size in prefix_sizes {
        let prefix1: String = random_word(prefix_size);
        let prefix2: String = random_word(prefix_size);
        for suffix_index in 0..suffix_count {
            let mut word = String::new();
            word.push_str(&prefix1);
            if suffix_index % 2 == 1 {
                word.push_str(&prefix2);
            }
            word.push_str(&random_word(suffix_size));
            words.push(word);
        }
    }
    words.sort();
    words.dedup();
    words.shuffle(&mut rng);
    words
}

pub fn compare_insert(c: &mut Criterion) {
    c.bench_function("insert/trie", |b| {
        b.iter_batched(
            || get_samples(3..24, 32, 4),
            |samples| {
                let mut trie = Trie::new(26);
                for word in samples {
                    trie.add(word).unwrap();
                }
            },
            criterion::BatchSize::LargeInput,
        )
    });
    c.bench_function("insert/radix", |b| {
        b.iter_batched(
            || get_samples(3..24, 32, 4),
            |samples| {
                let mut tree = RadixTree::new(26);
                for word in samples {
                    tree.add(word).unwrap();
                }
            },
            criterion::BatchSize::LargeInput,
        )
    });
    c.bench_function("insert/btree", |b| {
        b.iter_batched(
            || get_samples(3..24, 32, 4),
            |samples| {
                let mut btree = BTreeSet::new();
                for word in samples {
                    btree.insert(word);
                }
            },
            criterion::BatchSize::LargeInput,
        )
    });
}

pub fn compare_completions(c: &mut Criterion) {
    let samples = get_samples(3..24, 32, 4);
    let prefixes: Vec<String> = samples
        .iter()
        .take(64)
        .map(|word| word[..word.len().min(4)].to_string())
        .collect();

    let mut trie = Trie::new(26);
    let mut tree = RadixTree::new(26);
    let mut btree = BTreeSet::new();
    for word in &samples {
        trie.add(word.clone()).unwrap();
        tree.add(word.clone()).unwrap();
        btree.insert(word.clone());
    }

    c.bench_function("completions/trie", |b| {
        b.iter(|| {
            let mut out: Vec<String> = Vec::new();
            for prefix in &prefixes {
                trie.completions(prefix, &mut out).unwrap();
            }
            out
        })
    });
    c.bench_function("completions/radix", |b| {
        b.iter(|| {
            let mut out: Vec<String> = Vec::new();
            for prefix in &prefixes {
                tree.completions(prefix, &mut out).unwrap();
            }
            out
        })
    });
    c.bench_function("completions/btree", |b| {
        b.iter(|| {
            let mut out: Vec<String> = Vec::new();
            for prefix in &prefixes {
                out.extend(
                    btree
                        .range::<String, _>(prefix..)
                        .take_while(|word| word.starts_with(prefix.as_str()))
                        .cloned(),
                );
            }
            out
        })
    });
}

criterion_group!(benches, compare_insert, compare_completions);
criterion_main!(benches);
