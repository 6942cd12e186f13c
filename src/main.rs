use digitrie::Trie;

fn main() {
    let mut trie = Trie::new(26);
    for word in ["the", "quick", "brown", "fox"] {
        trie.add(word.to_string()).unwrap();
    }
    println!("{trie}");
    print!("{trie:?}");
}
