pub mod on_policy;
