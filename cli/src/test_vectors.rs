//! Submarine Test Vectors
//!
//! Fixed inputs with outputs computed independently of this crate. Any
//! change to these values breaks compatibility with commitments that were
//! generated before the change.

#[cfg(test)]
mod submarine_test_vectors {
    use submarine::crypto::{address_from_secret, create_address, keccak256, EMPTY_TRIE_ROOT, UNLOCK_SELECTOR};
    use submarine::rlp::{encode, encode_uint, RlpItem};
    use submarine::{derive, Address, CommitParams, SignedTransaction, Witness};

    const SECRET_ONE: [u8; 32] = [
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01,
    ];

    /// Test Vector 1: complete derivation with fixed witness
    #[test]
    fn test_vector_1_full_derivation() {
        let params = CommitParams {
            sender: address_from_secret(&SECRET_ONE).unwrap(),
            target: Address([0x11; 20]),
            value: 1_337_000_000_000_000,
            payload: vec![0xca, 0xfe],
            gas_price: 50_000_000_000,
            gas_limit: 3_712_394,
        };
        let commitment = derive(&params, &Witness::new([0x42; 32])).unwrap();

        assert_eq!(
            commitment.commit_id.to_string(),
            "0xe5c992fee44a61312cf6e14ad3f0dac0733dd38bd068fa5a6d782c450a3be59c"
        );
        assert_eq!(
            hex::encode(&commitment.unlock_tx_bytes),
            "f84f80850ba43b74008338a58a9411111111111111111111111111111111111111118704bffe92109000a6ec9b5b3a\
             e5c992fee44a61312cf6e14ad3f0dac0733dd38bd068fa5a6d782c450a3be59ccafe"
        );
        assert_eq!(
            commitment.unlock_hash.to_string(),
            "0xe23d8665f11f7bc486f29f1d6a8d7f71ff4606d2a22558a4885177dae9caad2d"
        );
        assert_eq!(commitment.keyless_sender.to_string(), "0x24618e9d6fbbd809921878cbc1b628a2a7e10859");
        assert_eq!(commitment.one_time_address.to_string(), "0x084c50fc083d2df096152f07ef4e2c555d2ce911");
        assert_eq!(commitment.required_commit_amount(), 186_956_700_000_000_000);
    }

    /// Test Vector 2: contract creation addresses
    #[test]
    fn test_vector_2_create_address() {
        let sender: Address = "0x6ac7ea33f8831ea9dcc53393aaa88b25a785dbf0".parse().unwrap();
        let expected = [
            "0xcd234a471b72ba2f1ccf0a70fcaba648a5eecd8d",
            "0x343c43a37d37dff08ae8c4a11544c718abb4fcf8",
        ];
        for (nonce, address) in expected.iter().enumerate() {
            assert_eq!(create_address(&sender, nonce as u64).to_string(), *address);
        }
    }

    /// Test Vector 3: replay-protected transaction from the EIP-155 reference
    #[test]
    fn test_vector_3_eip155_sender() {
        let raw = hex::decode(
            "f86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a0\
             28ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b38\
             00ccf555c9f3dc64214b297fb1966a3b6d83",
        )
        .unwrap();
        let tx = SignedTransaction::decode(&raw).unwrap();
        assert_eq!(tx.chain_id(), Some(1));
        assert_eq!(
            tx.recover_sender().unwrap().to_string(),
            "0x9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f"
        );
    }

    /// Test Vector 4: hash constants
    #[test]
    fn test_vector_4_constants() {
        assert_eq!(
            keccak256(b"").to_string(),
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
        assert_eq!(
            EMPTY_TRIE_ROOT.to_string(),
            "0x56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421"
        );
        assert_eq!(hex::encode(UNLOCK_SELECTOR), "ec9b5b3a");
        assert_eq!(
            address_from_secret(&SECRET_ONE).unwrap().to_string(),
            "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }

    /// Test Vector 5: codec reference encodings
    #[test]
    fn test_vector_5_rlp() {
        let cat_dog = RlpItem::List(vec![RlpItem::bytes(b"cat".to_vec()), RlpItem::bytes(b"dog".to_vec())]);
        assert_eq!(hex::encode(encode(&cat_dog)), "c88363617483646f67");
        assert_eq!(hex::encode(encode_uint(1024)), "820400");
        assert_eq!(hex::encode(encode_uint(0)), "80");
    }
}
