#![no_main]

use libfuzzer_sys::fuzz_target;
use servicelines::core::*;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Must not panic — errors are fine, panics are bugs.
        let store =
            MemoryStore::new().with(ServiceLineBuilder::new("abcdef1234", "Fiber 500").build());
        let attacher = ServiceLineAttacher::new(&store).on_missing(MissingServiceLine::Skip);
        if let Ok(invoices) = servicelines::json::new_collection(s, &attacher) {
            for item in invoices.iter().flat_map(|i| &i.items) {
                let known = item
                    .service_line_id()
                    .is_some_and(|id| id.as_str() == "abcdef1234");
                assert_eq!(item.service_line.is_some(), known);
            }
        }
    }
});
