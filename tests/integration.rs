//! Runs against a real Redis server on 127.0.0.1:6379 and compares our replies with the ones the
//! `redis` crate gets for the same commands.
//!
//! ```text
//! cargo test --test integration -- --ignored
//! ```

use bytes::Bytes;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serial_test::serial;
use tokio::time::{sleep, Duration};

use rustdis::commands::{Aggregate, Limit, SortOptions};
use rustdis::{Action, Client, Command, Config, Error, MessageKind, Value};

async fn connect() -> (Client, MultiplexedConnection) {
    let ours = Client::connect(&Config::default()).await.unwrap();

    let their_client = redis::Client::open("redis://127.0.0.1:6379/").unwrap();
    let mut theirs = their_client
        .get_multiplexed_async_connection()
        .await
        .unwrap();

    // Since we use the same Redis instance for all tests, we flush it to start fresh.
    let _: () = redis::cmd("FLUSHDB").query_async(&mut theirs).await.unwrap();

    (ours, theirs)
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Redis server"]
async fn test_strings() {
    let (mut ours, mut theirs) = connect().await;

    ours.set("greeting", "hello world").await.unwrap();
    let their_value: String = theirs.get("greeting").await.unwrap();
    assert_eq!(their_value, "hello world");

    let _: () = theirs.set("counter", 10).await.unwrap();
    assert_eq!(ours.incrby("counter", 5).await.unwrap(), 15);
    assert_eq!(ours.decr("counter").await.unwrap(), 14);
    assert_eq!(ours.incrbyfloat("counter", 0.5).await.unwrap(), 14.5);

    assert_eq!(ours.append("greeting", "!").await.unwrap(), 12);
    assert_eq!(ours.strlen("greeting").await.unwrap(), 12);
    assert_eq!(
        ours.getrange("greeting", 0, 4).await.unwrap(),
        Bytes::from("hello")
    );

    ours.mset(&[("a", "1"), ("b", "2")]).await.unwrap();
    let their_values: Vec<Option<String>> = theirs.mget(&["a", "b", "c"]).await.unwrap();
    let our_values = ours.mget(&["a", "b", "c"]).await.unwrap();
    assert_eq!(
        our_values,
        their_values
            .into_iter()
            .map(|v| v.map(Bytes::from))
            .collect::<Vec<_>>()
    );

    assert!(!ours.msetnx(&[("a", "x"), ("z", "y")]).await.unwrap());
    assert!(ours.setnx("fresh", "v").await.unwrap());

    assert_eq!(ours.setbit("bits", 7, 1).await.unwrap(), 0);
    assert_eq!(ours.getbit("bits", 7).await.unwrap(), 1);
    assert_eq!(ours.bitcount("bits", None).await.unwrap(), 1);
    assert_eq!(ours.bitpos("bits", 1, Some(0), None).await.unwrap(), 7);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Redis server"]
async fn test_values_with_special_characters() {
    let (mut ours, mut theirs) = connect().await;

    let value = "line one\r\nline \"two\"\t\\ end";
    ours.set("special", value).await.unwrap();

    let their_value: String = theirs.get("special").await.unwrap();
    assert_eq!(their_value, value);

    let _: () = theirs.set("binary", &b"\x00\x01\xff"[..]).await.unwrap();
    assert_eq!(
        ours.get("binary").await.unwrap(),
        Some(Bytes::from_static(b"\x00\x01\xff"))
    );
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Redis server"]
async fn test_keys() {
    let (mut ours, mut theirs) = connect().await;

    let _: () = theirs.set("k", "v").await.unwrap();

    assert_eq!(ours.exists(&["k", "missing"]).await.unwrap(), 1);
    assert!(ours.expire("k", 100, false).await.unwrap());
    let ttl = ours.ttl("k", true).await.unwrap();
    assert!(ttl > 0 && ttl <= 100_000);
    assert!(ours.persist("k").await.unwrap());
    assert_eq!(ours.ttl("k", false).await.unwrap(), -1);
    assert_eq!(ours.key_type("k").await.unwrap(), "string");

    let dump = ours.dump("k").await.unwrap().unwrap();
    ours.restore("k2", 0, &dump, false).await.unwrap();
    let their_value: String = theirs.get("k2").await.unwrap();
    assert_eq!(their_value, "v");

    ours.rename("k2", "k3").await.unwrap();
    assert!(!ours.renamenx("k3", "k").await.unwrap());
    assert_eq!(ours.keys("k*").await.unwrap().len(), 2);
    assert_eq!(ours.del(&["k", "k3", "missing"]).await.unwrap(), 2);
    assert_eq!(ours.randomkey().await.unwrap(), None);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Redis server"]
async fn test_lists_and_sort() {
    let (mut ours, mut theirs) = connect().await;

    assert_eq!(ours.rpush("l", &["3", "1", "2"]).await.unwrap(), 3);
    let theirs_range: Vec<String> = theirs.lrange("l", 0, -1).await.unwrap();
    assert_eq!(theirs_range, vec!["3", "1", "2"]);

    let sorted = ours
        .sort(
            "l",
            SortOptions {
                limit: Some(Limit::new(0, 2)),
                descending: true,
                alpha: false,
            },
        )
        .await
        .unwrap();
    assert_eq!(sorted, vec![Bytes::from("3"), Bytes::from("2")]);
    assert_eq!(
        ours.sort_store("l", SortOptions::default(), "sorted")
            .await
            .unwrap(),
        3
    );

    assert_eq!(ours.lpop("l").await.unwrap(), Some(Bytes::from("3")));
    assert_eq!(ours.lindex("l", -1).await.unwrap(), Some(Bytes::from("2")));
    assert_eq!(
        ours.blpop(&["empty", "l"], 1).await.unwrap(),
        Some((String::from("l"), Bytes::from("1")))
    );
    assert_eq!(ours.brpop(&["empty"], 1).await.unwrap(), None);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Redis server"]
async fn test_sets_and_sorted_sets() {
    let (mut ours, mut theirs) = connect().await;

    let _: () = theirs.sadd("s1", &["a", "b", "c"]).await.unwrap();
    let _: () = theirs.sadd("s2", &["b", "c", "d"]).await.unwrap();

    let mut inter = ours.sinter(&["s1", "s2"]).await.unwrap();
    inter.sort();
    assert_eq!(inter, vec![Bytes::from("b"), Bytes::from("c")]);
    assert_eq!(ours.sunionstore("s3", &["s1", "s2"]).await.unwrap(), 4);

    assert_eq!(
        ours.zadd("z", &[(1.0, "one"), (2.0, "two"), (3.0, "three")])
            .await
            .unwrap(),
        3
    );
    let their_range: Vec<(String, f64)> = theirs.zrange_withscores("z", 0, -1).await.unwrap();
    let our_range = ours.zrange_with_scores("z", 0, -1).await.unwrap();
    assert_eq!(
        our_range,
        their_range
            .into_iter()
            .map(|(m, s)| (Bytes::from(m), s))
            .collect::<Vec<_>>()
    );

    assert_eq!(
        ours.zrevrangebyscore("z", "+inf", "(1", Some(Limit::new(0, 1)))
            .await
            .unwrap(),
        vec![Bytes::from("three")]
    );
    assert_eq!(ours.zrank("z", "two").await.unwrap(), Some(1));
    assert_eq!(ours.zscore("z", "missing").await.unwrap(), None);
    assert_eq!(
        ours.zunionstore("zu", &["z", "z"], Some(&[1.0, 2.0]), Some(Aggregate::Max))
            .await
            .unwrap(),
        3
    );
    assert_eq!(ours.zscore("zu", "three").await.unwrap(), Some(6.0));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Redis server"]
async fn test_hashes() {
    let (mut ours, mut theirs) = connect().await;

    ours.hmset("h", &[("name", "rustdis"), ("kind", "a client")])
        .await
        .unwrap();
    let their_value: String = theirs.hget("h", "kind").await.unwrap();
    assert_eq!(their_value, "a client");

    assert!(ours.hset("h", "count", "1").await.unwrap());
    assert_eq!(ours.hincrby("h", "count", 2).await.unwrap(), 3);
    assert_eq!(ours.hlen("h").await.unwrap(), 3);
    assert_eq!(ours.hgetall("h").await.unwrap().len(), 3);
    assert_eq!(ours.hdel("h", &["count", "missing"]).await.unwrap(), 1);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Redis server"]
async fn test_server_errors() {
    let (mut ours, mut theirs) = connect().await;

    let _: () = theirs.rpush("list", "x").await.unwrap();

    let res = ours.get("list").await;
    assert!(matches!(res, Err(Error::Server(ref s)) if s.starts_with("WRONGTYPE")));

    // The connection is still usable afterwards.
    assert_eq!(ours.ping().await.unwrap(), "PONG");
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Redis server"]
async fn test_transaction_aborted_by_concurrent_write() {
    let (mut ours, mut theirs) = connect().await;

    let reply = ours
        .transaction(&["balance"], false, |tx| {
            Box::pin(async move {
                tx.queue(Command::IncrBy {
                    key: String::from("balance"),
                    increment: 10,
                })
                .await
            })
        })
        .await
        .unwrap();
    assert_eq!(reply, Value::from(vec![Value::Integer(10)]));

    let mut other = theirs.clone();
    let reply = ours
        .transaction(&["balance"], false, move |tx| {
            Box::pin(async move {
                // Someone else writes the watched key before EXEC.
                let _: () = other.set("balance", 0).await.map_err(|e| {
                    Error::Transport(std::io::Error::new(std::io::ErrorKind::Other, e))
                })?;
                tx.queue(Command::IncrBy {
                    key: String::from("balance"),
                    increment: 10,
                })
                .await
            })
        })
        .await
        .unwrap();
    assert_eq!(reply, Value::Array(None));

    let balance: i64 = theirs.get("balance").await.unwrap();
    assert_eq!(balance, 0);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Redis server"]
async fn test_publish_subscribe() {
    let (mut ours, theirs) = connect().await;

    let publisher = tokio::spawn(async move {
        let mut theirs = theirs;
        sleep(Duration::from_millis(100)).await;
        let _: i64 = theirs.publish("news", "first").await.unwrap();
        let _: i64 = theirs.publish("news", "second").await.unwrap();
    });

    let mut received = vec![];
    ours.subscribe(&["news"], |message| {
        received.push(message.clone());
        if received.len() == 3 {
            Action::Unsubscribe(vec![])
        } else {
            Action::Continue
        }
    })
    .await
    .unwrap();

    publisher.await.unwrap();

    assert_eq!(received.len(), 3);
    assert_eq!(received[0].kind, MessageKind::Subscribe);
    assert_eq!(received[1].data(), Some(&Bytes::from("first")));
    assert_eq!(received[2].data(), Some(&Bytes::from("second")));

    assert_eq!(ours.ping().await.unwrap(), "PONG");
}
