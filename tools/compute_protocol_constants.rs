//! Tool to recompute the hard-coded protocol constants
//! Run with: cargo run --release

use sha3::{Digest, Keccak256};

fn keccak(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

fn main() {
    // Root of an empty trie: keccak of the encoded empty string
    println!("pub const EMPTY_TRIE_ROOT: H256 = H256([");
    print_bytes(&keccak(&[0x80]));
    println!("]);");
    println!();

    // First four bytes of keccak("unlock(bytes32)")
    let selector = &keccak(b"unlock(bytes32)")[..4];
    println!("pub const UNLOCK_SELECTOR: [u8; 4] = [");
    print_bytes(selector);
    println!("];");
}

fn print_bytes(bytes: &[u8]) {
    for chunk in bytes.chunks(8) {
        print!("   ");
        for b in chunk {
            print!(" 0x{:02x},", b);
        }
        println!();
    }
}
