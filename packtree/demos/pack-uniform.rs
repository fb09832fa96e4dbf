use packtree::{AtlasPacker, InputItem};

fn main() {
    env_logger::init();

    let inputs: Vec<_> = (0..5)
        .map(|i| InputItem::new(format!("tile{}", i), (128, 128)))
        .collect();

    let packer = AtlasPacker::new().padding(1).max_size((512, 512));

    match packer.pack(inputs) {
        Ok(result) => println!("Pack result: {:#?}", result),
        Err(err) => eprintln!("Pack failed: {}", err),
    }
}
