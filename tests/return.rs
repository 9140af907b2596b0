#[macro_use]
mod common;

#[cfg(test)]
mod _return {
    tests! {
        early in return is OK
        "early"
    }

    tests! {
        bare in return is OK
        "nil"
    }

    tests! {
        top_level in return is ERR
        "[line 1] Error at 'return': Return statement at the top level"
    }
}
