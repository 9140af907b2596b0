#[macro_use]
mod common;

#[cfg(test)]
mod block {
    tests! {
        scope in block is OK
        "inner"
        "global"
    }

    tests! {
        nested in block is OK
        "outer"
    }

    tests! {
        empty in block is OK
    }
}
