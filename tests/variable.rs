#[macro_use]
mod common;

#[cfg(test)]
mod variable {
    tests! {
        define in variable is OK
        "1"
        "nil"
    }

    tests! {
        redefine_global in variable is OK
        "2"
    }

    tests! {
        shadow in variable is OK
        "2"
        "1"
    }

    tests! {
        undefined in variable is ERR
        "[line 1] Error at 'ghost': Undefined variable 'ghost'"
    }

    tests! {
        use_in_own_initializer in variable is ERR
        "[line 2] Error at 'a': Cannot read local variable in its own initializer"
    }

    tests! {
        redefine_local in variable is ERR
        "[line 3] Error at 'a': Variable redefined in local scope"
    }

    tests! {
        assign_undefined in variable is ERR
        "[line 1] Error at 'ghost': Undefined variable 'ghost'"
    }
}
