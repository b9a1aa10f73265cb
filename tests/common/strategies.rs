use proptest::prelude::*;

/// Strategy for generating memcached-style `host:port` endpoints
///
/// Hosts starting with `redis` or `unix` are excluded; they would classify as
/// the lock-capable family.
pub fn memcached_endpoint_strategy() -> impl Strategy<Value = String> {
    (
        "[a-z][a-z0-9]{0,11}".prop_filter("host must not carry a redis/unix prefix", |host| {
            !host.starts_with("redis") && !host.starts_with("unix")
        }),
        1024u16..65535,
    )
        .prop_map(|(host, port)| format!("{}:{}", host, port))
}

/// Strategy for generating redis URLs
pub fn redis_endpoint_strategy() -> impl Strategy<Value = String> {
    ("[a-z][a-z0-9]{0,11}", 1024u16..65535)
        .prop_map(|(host, port)| format!("redis://{}:{}", host, port))
}

/// Strategy for generating a non-empty list of distinct endpoints of one family
pub fn endpoint_list_strategy() -> impl Strategy<Value = Vec<String>> {
    prop_oneof![
        prop::collection::hash_set(memcached_endpoint_strategy(), 1..6),
        prop::collection::hash_set(redis_endpoint_strategy(), 1..6),
    ]
    .prop_map(|set| set.into_iter().collect())
}

/// Strategy for generating an endpoint list together with a shuffled,
/// duplicated variant of the same set
pub fn endpoint_list_with_variant_strategy() -> impl Strategy<Value = (Vec<String>, Vec<String>)> {
    endpoint_list_strategy().prop_flat_map(|list| {
        let len = list.len();
        (
            Just(list.clone()),
            Just(list).prop_shuffle(),
            prop::collection::vec(0..len, 0..4),
        )
            .prop_map(|(original, mut variant, duplicates)| {
                for index in duplicates {
                    let endpoint = variant[index].clone();
                    variant.push(endpoint);
                }
                (original, variant)
            })
    })
}

/// Strategy for generating whitespace-separated server settings strings
pub fn server_setting_strategy() -> impl Strategy<Value = (Vec<String>, String)> {
    (
        endpoint_list_strategy(),
        prop::collection::vec(prop_oneof![Just(" "), Just("  "), Just("\t"), Just("\n")], 6),
    )
        .prop_map(|(list, separators)| {
            let mut setting = String::from(separators[0]);
            for (i, endpoint) in list.iter().enumerate() {
                setting.push_str(endpoint);
                setting.push_str(separators[(i + 1) % separators.len()]);
            }
            (list, setting)
        })
}
