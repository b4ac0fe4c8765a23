fn main() {
    recipe_costing_api::main();
}
