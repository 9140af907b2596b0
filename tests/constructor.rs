#[macro_use]
mod common;

#[cfg(test)]
mod constructor {
    tests! {
        init in constructor is OK
        "1"
        "2"
    }

    tests! {
        early_return in constructor is OK
        "true"
    }

    tests! {
        inherited_init in constructor is OK
        "inherited"
    }

    tests! {
        arity in constructor is ERR
        "[line 6] Error at ')': Expected 2 parameters, but got 1 arguments"
    }

    tests! {
        no_init_takes_no_arguments in constructor is ERR
        "[line 2] Error at ')': Expected 0 parameters, but got 1 arguments"
    }
}
