// Copyright 2023 Remi Bernotavicius

fn main() {
    // The migrations are embedded into the binary, so edits to them must rebuild it.
    println!("cargo:rerun-if-changed=migrations/");
}
