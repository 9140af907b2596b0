#[macro_use]
mod common;

#[cfg(test)]
mod method {
    tests! {
        bound_method in method is OK
        "Jane"
    }

    tests! {
        state in method is OK
        "1"
        "2"
    }
}
