//! Messages laid out the way prost generates them, with the validators
//! fieldcheck-codegen renders for them at build time.

#[derive(Clone, PartialEq, Debug, Default)]
pub struct Person {
    pub name: String,
    pub age: i32,
    pub id: String,
    pub tags: Vec<String>,
    pub scores: Vec<u64>,
    pub ratio: f32,
    pub nick: Option<String>,
    pub limit: Option<i64>,
    pub address: Option<Address>,
    pub items: Vec<Address>,
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct Address {
    pub street: String,
    pub zip: String,
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct Order {
    pub tags: Vec<String>,
    pub code: String,
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct Node {
    pub label: String,
    pub child: Option<Box<Node>>,
}

include!(concat!(env!("OUT_DIR"), "/people.pb.validation.rs"));
