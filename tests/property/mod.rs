// Property-based tests harness
mod strategies;
mod round_trip {
    include!("round_trip.rs");
}
mod tokens {
    include!("tokens.rs");
}
mod display {
    include!("display.rs");
}
