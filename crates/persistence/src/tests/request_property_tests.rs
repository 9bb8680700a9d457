// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Property tests over random submit/cancel sequences.

use proptest::prelude::*;
use time::Duration;

use super::{policy, seed_shirts, seed_staff, shirt_request, shirt_stock, t0};
use crate::Persistence;

#[derive(Debug, Clone)]
enum Op {
    Submit { staff: usize, quantity: i64 },
    Cancel { pick: usize },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..3, 1i64..4).prop_map(|(staff, quantity)| Op::Submit { staff, quantity }),
        any::<usize>().prop_map(|pick| Op::Cancel { pick }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_stock_and_allowance_hold(initial in 0i64..12, ops in proptest::collection::vec(op(), 1..25)) {
        let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
        let limits: [Option<u32>; 3] = [Some(3), Some(5), None];
        let staff: Vec<i64> = limits
            .iter()
            .enumerate()
            .map(|(i, limit)| seed_staff(&mut persistence, &format!("Staff {i}"), *limit))
            .collect();
        seed_shirts(&mut persistence, initial);

        for (step, op) in ops.into_iter().enumerate() {
            let now = t0() + Duration::hours(25 * i64::try_from(step).unwrap());
            match op {
                Op::Submit { staff: index, quantity } => {
                    let _ = persistence.create_uniform_request(
                        &shirt_request(staff[index], quantity),
                        now,
                        &policy(),
                    );
                }
                Op::Cancel { pick } => {
                    let requests = persistence.list_requests().unwrap();
                    if !requests.is_empty() {
                        let _ = persistence.cancel_request(requests[pick % requests.len()].id, now);
                    }
                }
            }

            let stock: i64 = shirt_stock(&mut persistence);
            prop_assert!(stock >= 0);

            let active: i64 = persistence
                .list_requests()
                .unwrap()
                .iter()
                .filter(|r| r.status != d1_store_domain::RequestStatus::Cancelled)
                .map(|r| r.quantity)
                .sum();
            prop_assert_eq!(stock, initial - active);

            for (staff_id, limit) in staff.iter().zip(limits) {
                let eligibility = persistence.staff_eligibility(*staff_id, now, 24).unwrap();
                if let Some(limit) = limit {
                    prop_assert!(eligibility.total_ordered <= i64::from(limit));
                }
            }
        }
    }
}
