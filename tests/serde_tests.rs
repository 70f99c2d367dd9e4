// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

#[cfg(feature = "serde")]
mod tests {
    use redstone_nbt::tag::codec;
    use redstone_nbt::tag::serde_impl::{from_tag, to_tag};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Player {
        name: String,
        age: i32,
        active: bool,
        scores: Vec<i32>,
        metadata: Meta,
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Meta {
        version: String,
        tags: Vec<String>,
    }

    fn sample() -> Player {
        Player {
            name: "Steve".to_owned(),
            age: 25,
            active: true,
            scores: vec![10, 20, 30],
            metadata: Meta {
                version: "1.0".to_owned(),
                tags: vec!["player".to_owned(), "admin".to_owned()],
            },
        }
    }

    #[test]
    fn struct_round_trips_through_a_tag_tree() {
        let original = sample();
        let tag = to_tag(&original).unwrap();
        let decoded: Player = from_tag(tag).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn struct_round_trips_through_the_wire_codec() {
        let original = sample();
        let tag = to_tag(&original).unwrap();

        let bytes = codec::write_named("root", &tag);
        let (name, decoded_tag) = codec::read_named(&bytes).unwrap();
        assert_eq!(name, "root");

        let decoded: Player = from_tag(decoded_tag).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn option_fields_round_trip() {
        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        struct WithOptional {
            label: String,
            nickname: Option<String>,
        }

        let with_value = WithOptional {
            label: "a".into(),
            nickname: Some("b".into()),
        };
        let tag = to_tag(&with_value).unwrap();
        assert_eq!(from_tag::<WithOptional>(tag).unwrap(), with_value);

        let without_value = WithOptional {
            label: "a".into(),
            nickname: None,
        };
        let tag = to_tag(&without_value).unwrap();
        assert_eq!(from_tag::<WithOptional>(tag).unwrap(), without_value);
    }
}
